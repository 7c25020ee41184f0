//! The banner canvas.
//!
//! A [`Canvas`] is a fixed-size RGBA buffer that images and text are pasted
//! onto, one banner at a time. It remembers where each image landed
//! ([`Placement`]) so text can be laid out beside them, and it owns a unique
//! output path so concurrent or repeated renders never overwrite each other.
//!
//! ```no_run
//! use banner_renderer::{BannerConfig, BannerFont, Canvas, FontSpec, ImageOptions};
//! use std::path::Path;
//!
//! let config = BannerConfig::default();
//! let mut canvas = Canvas::from_config(&config)?;
//! canvas.add_image(Path::new("images/cat.png"), ImageOptions::default().resized().right_aligned())?;
//! canvas.add_image(Path::new("assets/logos/badge.png"), ImageOptions::default())?;
//!
//! let font = BannerFont::embedded()?;
//! canvas.add_text(&FontSpec::new(font, "Hello World", config.text_rgba()?, config.text_size))?;
//! let output = canvas.save()?;
//! # Ok::<(), banner_renderer::BannerError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info};

use crate::composite::{composite_over, lighten, replace, stretch, thumbnail};
use crate::config::BannerConfig;
use crate::error::{BannerError, BannerResult};
use crate::placement::{Placement, SizePx, min_right_edge};
use crate::source::load_image;
use crate::text::{FontSpec, TextBlock, wrap_text};

// ============================================================================
// Options
// ============================================================================

/// Where and how [`Canvas::add_image`] pastes an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageOptions {
    /// Shrink to the canvas's image box even if the image already fits.
    pub resize: bool,
    /// Top offset. `None` uses the canvas's default top margin.
    pub top: Option<u32>,
    /// Left offset. Ignored when `right` is set.
    pub left: u32,
    /// Align the image's right edge with the canvas's right edge.
    pub right: bool,
}

impl ImageOptions {
    pub fn at(top: u32, left: u32) -> Self {
        Self {
            top: Some(top),
            left,
            ..Self::default()
        }
    }

    pub fn resized(mut self) -> Self {
        self.resize = true;
        self
    }

    pub fn right_aligned(mut self) -> Self {
        self.right = true;
        self
    }
}

/// Layout constants taken from [`BannerConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasLayout {
    pub resize_percentage: f32,
    pub overlay_alpha: u8,
    pub top_margin: u32,
    pub text_padding_horizontal: u32,
    pub text_padding_vertical: u32,
    pub short_text_shift: u32,
    pub chars_per_line: usize,
    pub single_image_chars_factor: f32,
}

impl From<&BannerConfig> for CanvasLayout {
    fn from(config: &BannerConfig) -> Self {
        Self {
            resize_percentage: config.resize_percentage,
            overlay_alpha: config.overlay_alpha,
            top_margin: config.default_top_margin(),
            text_padding_horizontal: config.text_padding_horizontal,
            text_padding_vertical: config.text_padding_vertical,
            short_text_shift: config.short_text_shift,
            chars_per_line: config.chars_per_line,
            single_image_chars_factor: config.single_image_chars_factor,
        }
    }
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self::from(&BannerConfig::default())
    }
}

/// One compositing step, as planned by the
/// [`BannerAssembler`](crate::BannerAssembler).
#[derive(Debug, Clone)]
pub enum BannerLayer {
    /// Lightened image behind everything else.
    Background { path: PathBuf, resize: bool },
    /// Image pasted with its alpha channel.
    Image { path: PathBuf, options: ImageOptions },
    /// Wrapped text.
    Text(FontSpec),
}

/// What applying a [`BannerLayer`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutput {
    Background,
    Image(Placement),
    Text(TextBlock),
}

// ============================================================================
// Canvas
// ============================================================================

pub struct Canvas {
    image: RgbaImage,
    background: Rgba<u8>,
    layout: CanvasLayout,
    placements: Vec<Placement>,
    output_path: PathBuf,
}

impl Canvas {
    /// Creates a blank canvas filled with `background`.
    pub fn new(
        size: SizePx,
        background: Rgba<u8>,
        layout: CanvasLayout,
        output_path: PathBuf,
    ) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, background),
            background,
            layout,
            placements: Vec::new(),
            output_path,
        }
    }

    /// Creates a canvas sized and styled by `config`, writing to a fresh
    /// timestamped file in the configured images directory.
    pub fn from_config(config: &BannerConfig) -> BannerResult<Self> {
        let output_path = unique_output_path(&config.images_dir, &config.output_file);
        Ok(Self::new(
            config.canvas_size(),
            config.background_rgba()?,
            CanvasLayout::from(config),
            output_path,
        ))
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.image.width(), self.image.height())
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pastes the image at `path` and records where it landed.
    ///
    /// Images larger than the canvas, or any image when `options.resize` is
    /// set, are shrunk to fit a square of `resize_percentage` of the canvas
    /// height.
    pub fn add_image(&mut self, path: &Path, options: ImageOptions) -> BannerResult<Placement> {
        let mut img = load_image(path)?;

        let source_size = SizePx::new(img.width(), img.height());
        if options.resize || source_size.exceeds(self.size()) {
            let side = self.image.height() as f32 * self.layout.resize_percentage;
            img = thumbnail(img, side, side);
        }

        let size = SizePx::new(img.width(), img.height());
        let left = if options.right {
            self.image.width().saturating_sub(size.width)
        } else {
            options.left
        };
        let top = options.top.unwrap_or(self.layout.top_margin);

        composite_over(&mut self.image, &img, left as i64, top as i64);

        let placement = Placement::new(left, top, size);
        debug!(path = %path.display(), ?placement, "pasted image");
        self.placements.push(placement);
        Ok(placement)
    }

    /// Paints a lightened copy of the image at `path` as the backdrop.
    ///
    /// Without `resize` the image is stretched over the whole canvas. With
    /// `resize` it is shrunk to fit `resize_percentage` of the canvas width
    /// at full height and right-aligned; the rest keeps the background color.
    /// Backgrounds are not recorded as placements.
    pub fn add_background(&mut self, path: &Path, resize: bool) -> BannerResult<()> {
        let img = lighten(&load_image(path)?, self.layout.overlay_alpha);
        let canvas = self.size();

        if resize {
            let max_width = canvas.width as f32 * self.layout.resize_percentage;
            let fitted = thumbnail(img, max_width, canvas.height as f32);
            let left = canvas.width.saturating_sub(fitted.width());
            replace(&mut self.image, &fitted, left as i64, 0);
            debug!(path = %path.display(), left, width = fitted.width(), "pasted side background");
        } else {
            replace(&mut self.image, &stretch(&img, canvas), 0, 0);
            debug!(path = %path.display(), "pasted full background");
        }
        Ok(())
    }

    /// Wraps and draws `spec.text`, returning the resulting layout.
    pub fn add_text(&mut self, spec: &FontSpec) -> BannerResult<TextBlock> {
        let lines = wrap_text(&spec.text, self.chars_per_line());
        let line_height = spec.font.line_height(spec.size);
        let (left, top) = spec.offset.unwrap_or_else(|| self.text_origin(lines.len()));

        for (i, line) in lines.iter().enumerate() {
            let y = top + (i as u32 * line_height) as i32;
            draw_text_mut(
                &mut self.image,
                spec.color,
                left,
                y,
                spec.size,
                spec.font.face(),
                line,
            );
        }

        debug!(lines = lines.len(), left, top, line_height, "drew text");
        Ok(TextBlock {
            lines,
            left,
            top,
            line_height,
        })
    }

    /// Runs one planned layer.
    pub fn apply(&mut self, layer: &BannerLayer) -> BannerResult<LayerOutput> {
        match layer {
            BannerLayer::Background { path, resize } => {
                self.add_background(path, *resize)?;
                Ok(LayerOutput::Background)
            }
            BannerLayer::Image { path, options } => {
                self.add_image(path, *options).map(LayerOutput::Image)
            }
            BannerLayer::Text(spec) => self.add_text(spec).map(LayerOutput::Text),
        }
    }

    /// Writes the canvas as PNG to its output path and returns that path.
    pub fn save(&self) -> BannerResult<PathBuf> {
        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BannerError::io(parent, e))?;
        }
        self.image
            .save_with_format(&self.output_path, ImageFormat::Png)
            .map_err(|e| {
                BannerError::render(format!("write {}: {e}", self.output_path.display()))
            })?;
        info!(path = %self.output_path.display(), "saved banner");
        Ok(self.output_path.clone())
    }

    /// Characters per line: wider when a single image leaves more room.
    fn chars_per_line(&self) -> usize {
        let base = self.layout.chars_per_line;
        if self.placements.len() == 1 {
            (base as f32 * self.layout.single_image_chars_factor).round() as usize
        } else {
            base
        }
    }

    /// Default text origin: right of the closest image edge, pushed down for
    /// short text.
    fn text_origin(&self, line_count: usize) -> (i32, i32) {
        let left = min_right_edge(&self.placements).unwrap_or(0)
            + self.layout.text_padding_horizontal;
        let mut top = self.layout.text_padding_vertical;
        if line_count < 3 {
            top += self.layout.short_text_shift;
        }
        (left as i32, top as i32)
    }
}

// ============================================================================
// Output naming
// ============================================================================

static LAST_TOKEN_MICROS: AtomicI64 = AtomicI64::new(0);

/// Builds `<dir>/<stem>_<timestamp>.<ext>` from a base file name.
///
/// The timestamp has microsecond resolution and is strictly increasing within
/// the process, so consecutive calls always yield distinct paths.
pub fn unique_output_path(dir: &Path, file_name: &str) -> PathBuf {
    let base = Path::new(file_name);
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("banner");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("png");
    dir.join(format!("{stem}_{}.{ext}", timestamp_token()))
}

fn timestamp_token() -> String {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_TOKEN_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or(now);
    let micros = now.max(previous + 1);

    let secs = micros.div_euclid(1_000_000);
    let frac = micros.rem_euclid(1_000_000);
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => format!("{}{frac:06}", dt.format("%Y%m%d%H%M%S")),
        None => micros.to_string(),
    }
}
