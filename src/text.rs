//! Fonts, word wrapping and text layout metrics.

use std::fmt;
use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::Rgba;

use crate::error::{BannerError, BannerResult};

static EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

// ============================================================================
// BannerFont
// ============================================================================

/// A loaded font face, cheap to clone.
#[derive(Clone)]
pub struct BannerFont {
    face: FontArc,
}

impl BannerFont {
    /// The font compiled into the crate (DejaVu Sans).
    pub fn embedded() -> BannerResult<Self> {
        let face = FontArc::try_from_slice(EMBEDDED_FONT)
            .map_err(|e| BannerError::font(format!("embedded font: {e}")))?;
        Ok(Self { face })
    }

    /// Loads a TrueType/OpenType font file.
    pub fn from_file(path: &Path) -> BannerResult<Self> {
        let data = fs::read(path).map_err(|e| BannerError::io(path, e))?;
        let face = FontArc::try_from_vec(data)
            .map_err(|e| BannerError::font(format!("{}: {e}", path.display())))?;
        Ok(Self { face })
    }

    /// Loads `path` when given, the embedded font otherwise.
    pub fn load(path: Option<&Path>) -> BannerResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn face(&self) -> &FontArc {
        &self.face
    }

    /// Vertical advance between consecutive lines at `size` pixels.
    pub fn line_height(&self, size: f32) -> u32 {
        let scaled = self.face.as_scaled(PxScale::from(size));
        (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32
    }
}

impl fmt::Debug for BannerFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BannerFont")
            .field("glyphs", &self.face.glyph_count())
            .finish()
    }
}

// ============================================================================
// FontSpec
// ============================================================================

/// What to draw and how: text, face, color, size and an optional fixed origin.
#[derive(Debug, Clone)]
pub struct FontSpec {
    pub font: BannerFont,
    pub text: String,
    pub color: Rgba<u8>,
    pub size: f32,
    /// Top-left of the first line. `None` lets the canvas place the text
    /// next to the images already on it.
    pub offset: Option<(i32, i32)>,
}

impl FontSpec {
    pub fn new(font: BannerFont, text: impl Into<String>, color: Rgba<u8>, size: f32) -> Self {
        Self {
            font,
            text: text.into(),
            color,
            size,
            offset: None,
        }
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = Some((x, y));
        self
    }
}

/// Text as laid out on a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub left: i32,
    pub top: i32,
    pub line_height: u32,
}

// ============================================================================
// Wrapping
// ============================================================================

/// Greedily wraps `text` into lines of at most `width` characters.
///
/// Whitespace runs (newlines included) collapse to single spaces. Words
/// longer than `width` start a new line and are split into `width`-sized
/// pieces. A `width` of zero is treated as one.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(width).map(|c| c.iter().collect::<String>());
            // every piece but the last is a full line
            let mut last = pieces.next().unwrap_or_default();
            for piece in pieces {
                lines.push(std::mem::replace(&mut last, piece));
            }
            current_len = last.chars().count();
            current = last;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
