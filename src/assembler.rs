//! Turns a [`BannerRequest`] into a rendered PNG.
//!
//! The assembler resolves the request's images (downloading remote ones),
//! plans the compositing layers and runs them on a fresh [`Canvas`]:
//!
//! ```text
//! secondary image ──► background (lightened, full canvas)   if request.background
//!                 └─► image (shrunk, right-aligned)         otherwise
//! logo ─────────────► image (default margin, left edge)
//! text ─────────────► wrapped text beside the images
//! ```
//!
//! Errors are never swallowed: a failed fetch, decode or write surfaces to
//! the caller and no output file is left behind.

use std::path::PathBuf;

use tracing::info;

use crate::canvas::{BannerLayer, Canvas, ImageOptions, LayerOutput};
use crate::config::BannerConfig;
use crate::error::BannerResult;
use crate::fetch::ImageFetcher;
use crate::placement::Placement;
use crate::request::BannerRequest;
use crate::text::{BannerFont, FontSpec, TextBlock};

/// Result of a render: where the PNG went and how it was laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBanner {
    pub path: PathBuf,
    pub placements: Vec<Placement>,
    pub text: Option<TextBlock>,
}

pub struct BannerAssembler {
    config: BannerConfig,
    fetcher: ImageFetcher,
    font: BannerFont,
}

impl BannerAssembler {
    /// Builds an assembler from a validated config: the fetcher caches into
    /// `images_dir`, the font comes from `font_path` or the embedded face.
    pub fn new(config: BannerConfig) -> BannerResult<Self> {
        config.validate()?;
        let fetcher = ImageFetcher::new(&config.images_dir, config.download_chunk_size)?;
        let font = BannerFont::load(config.font_path.as_deref())?;
        Ok(Self::with_parts(config, fetcher, font))
    }

    pub fn with_parts(config: BannerConfig, fetcher: ImageFetcher, font: BannerFont) -> Self {
        Self {
            config,
            fetcher,
            font,
        }
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &ImageFetcher {
        &self.fetcher
    }

    /// Resolves the request's images and returns the layers to composite, in
    /// order.
    pub fn plan(&self, request: &BannerRequest) -> BannerResult<Vec<BannerLayer>> {
        let secondary = self.fetcher.resolve(&request.image_ref())?;
        let logo = self.fetcher.resolve(&request.logo_ref())?;

        let first = if request.background {
            BannerLayer::Background {
                path: secondary,
                resize: false,
            }
        } else {
            BannerLayer::Image {
                path: secondary,
                options: ImageOptions::default().resized().right_aligned(),
            }
        };

        let text = FontSpec::new(
            self.font.clone(),
            request.text.clone(),
            self.config.text_rgba()?,
            self.config.text_size,
        );

        Ok(vec![
            first,
            BannerLayer::Image {
                path: logo,
                options: ImageOptions::default(),
            },
            BannerLayer::Text(text),
        ])
    }

    /// Renders the banner and reports its layout.
    #[tracing::instrument(
        skip(self, request),
        fields(name = request.name.as_deref().unwrap_or("-"), background = request.background)
    )]
    pub fn render(&self, request: &BannerRequest) -> BannerResult<RenderedBanner> {
        let layers = self.plan(request)?;
        let mut canvas = Canvas::from_config(&self.config)?;

        let mut text = None;
        for layer in &layers {
            if let LayerOutput::Text(block) = canvas.apply(layer)? {
                text = Some(block);
            }
        }

        let path = canvas.save()?;
        info!(path = %path.display(), placements = canvas.placements().len(), "generated banner");
        Ok(RenderedBanner {
            path,
            placements: canvas.placements().to_vec(),
            text,
        })
    }

    /// Renders the banner and returns the path of the PNG.
    pub fn generate(&self, request: &BannerRequest) -> BannerResult<PathBuf> {
        self.render(request).map(|rendered| rendered.path)
    }
}
