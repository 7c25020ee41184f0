//! Renderer configuration.
//!
//! [`BannerConfig`] collects every constant the renderer uses (canvas size,
//! colors, paddings, wrapping budget, storage locations) in a serde type that
//! can be read from a JSON file. Every field has a default, so a config file
//! only needs the values it overrides:
//!
//! ```json
//! {
//!   "width": 800,
//!   "backgroundColor": "#f0f0f0",
//!   "imagesDir": "/var/lib/banners/images"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use image::Rgba;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{BannerError, BannerResult};
use crate::placement::SizePx;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerConfig {
    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Canvas fill color as a hex string (`#rrggbb` or `#rgb`).
    pub background_color: String,

    /// Text color as a hex string.
    pub text_color: String,

    /// Base output filename; a timestamp token is inserted before the extension.
    pub output_file: String,

    /// Directory holding downloaded images and rendered banners.
    pub images_dir: PathBuf,

    /// Directory scanned for the selectable logo assets.
    pub logo_dir: PathBuf,

    /// TrueType/OpenType font for banner text. `None` uses the embedded font.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Font size in pixels.
    pub text_size: f32,

    /// Gap between the closest image edge and the start of the text.
    pub text_padding_horizontal: u32,

    /// Top offset of the first text line.
    pub text_padding_vertical: u32,

    /// Extra top offset applied when the text wraps to fewer than three lines.
    pub short_text_shift: u32,

    /// Characters per wrapped line with two images on the canvas.
    pub chars_per_line: usize,

    /// Multiplier for `chars_per_line` when only one image is placed.
    pub single_image_chars_factor: f32,

    /// Fraction of the canvas height (or width, for backgrounds) that
    /// shrunk images are fitted to.
    pub resize_percentage: f32,

    /// Alpha of the white overlay that lightens background images.
    pub overlay_alpha: u8,

    /// Bytes per chunk when streaming downloads to disk.
    pub download_chunk_size: usize,

    /// JSON file holding named banners.
    pub store_file: PathBuf,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 150,
            background_color: "#ffffff".to_string(),
            text_color: "#000000".to_string(),
            output_file: "out.png".to_string(),
            images_dir: PathBuf::from("images"),
            logo_dir: PathBuf::from("assets/logos"),
            font_path: None,
            text_size: 24.0,
            text_padding_horizontal: 10,
            text_padding_vertical: 20,
            short_text_shift: 20,
            chars_per_line: 30,
            single_image_chars_factor: 1.4,
            resize_percentage: 0.8,
            overlay_alpha: 178,
            download_chunk_size: 2000,
            store_file: PathBuf::from("banners.json"),
        }
    }
}

impl BannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and validates a config from a JSON file.
    pub fn load(path: &Path) -> BannerResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| BannerError::io(path, e))?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> BannerResult<Self> {
        serde_json::from_str(json).map_err(|e| BannerError::config(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> BannerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BannerError::config(e.to_string()))
    }

    pub fn validate(&self) -> BannerResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BannerError::config(format!(
                "canvas size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.resize_percentage > 0.0 && self.resize_percentage <= 1.0) {
            return Err(BannerError::config(format!(
                "resizePercentage must be in (0, 1], got {}",
                self.resize_percentage
            )));
        }
        if self.download_chunk_size == 0 {
            return Err(BannerError::config("downloadChunkSize must be non-zero"));
        }
        let is_png = Path::new(&self.output_file)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(BannerError::config(format!(
                "outputFile must be a .png name, got '{}'",
                self.output_file
            )));
        }
        if self.text_size <= 0.0 {
            return Err(BannerError::config("textSize must be positive"));
        }
        self.background_rgba()?;
        self.text_rgba()?;
        Ok(())
    }

    pub fn canvas_size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }

    /// Top margin that vertically centers an image shrunk to
    /// `resize_percentage` of the canvas height.
    pub fn default_top_margin(&self) -> u32 {
        ((1.0 - self.resize_percentage) * self.height as f32 / 2.0).round() as u32
    }

    pub fn background_rgba(&self) -> BannerResult<Rgba<u8>> {
        parse_color(&self.background_color)
    }

    pub fn text_rgba(&self) -> BannerResult<Rgba<u8>> {
        parse_color(&self.text_color)
    }
}

/// Parses a hex color (`#rrggbb`, `rrggbb` or `#rgb`) into an opaque RGBA pixel.
pub fn parse_color(value: &str) -> BannerResult<Rgba<u8>> {
    let rgb: Srgb<u8> = value
        .trim()
        .parse()
        .map_err(|e| BannerError::config(format!("invalid color '{value}': {e}")))?;
    Ok(Rgba([rgb.red, rgb.green, rgb.blue, 255]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_banner() {
        let config = BannerConfig::default();
        assert_eq!(config.canvas_size(), SizePx::new(600, 150));
        assert_eq!(config.default_top_margin(), 15);
        assert_eq!(config.background_rgba().unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(config.text_rgba().unwrap(), Rgba([0, 0, 0, 255]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn top_margin_is_rounded_not_truncated() {
        // 1.0 - 0.8f32 is slightly below 0.2
        let config = BannerConfig {
            height: 100,
            ..BannerConfig::default()
        };
        assert_eq!(config.default_top_margin(), 10);

        let config = BannerConfig {
            height: 151,
            resize_percentage: 0.7,
            ..BannerConfig::default()
        };
        assert_eq!(config.default_top_margin(), 23);
    }

    #[test]
    fn output_file_must_be_png() {
        for name in ["banner.jpeg", "banner", "png"] {
            let config = BannerConfig {
                output_file: name.to_string(),
                ..BannerConfig::default()
            };
            assert!(matches!(config.validate(), Err(BannerError::Config(_))), "{name}");
        }

        let config = BannerConfig {
            output_file: "weekly.PNG".to_string(),
            ..BannerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BannerConfig::from_json(r##"{ "width": 800, "textColor": "#ff0000" }"##).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 150);
        assert_eq!(config.text_rgba().unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(config.output_file, "out.png");
    }

    #[test]
    fn json_format_is_camel_case() {
        let json = BannerConfig::default().to_json_pretty().unwrap();
        assert!(json.contains("\"backgroundColor\""));
        assert!(json.contains("\"downloadChunkSize\""));
        assert!(!json.contains("\"fontPath\""));
    }

    #[test]
    fn parse_color_accepts_short_and_bare_hex() {
        assert_eq!(parse_color("#fff").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_color("102030").unwrap(), Rgba([16, 32, 48, 255]));
        assert!(parse_color("not-a-color").is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = BannerConfig::default();
        config.height = 0;
        assert!(matches!(config.validate(), Err(BannerError::Config(_))));

        let mut config = BannerConfig::default();
        config.resize_percentage = 1.5;
        assert!(config.validate().is_err());

        let mut config = BannerConfig::default();
        config.download_chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = BannerConfig::default();
        config.background_color = "#zzzzzz".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.json");
        fs::write(&path, r#"{ "charsPerLine": 40 }"#).unwrap();

        let config = BannerConfig::load(&path).unwrap();
        assert_eq!(config.chars_per_line, 40);

        let missing = BannerConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(BannerError::Io { .. })));
    }
}
