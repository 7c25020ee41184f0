//! banner-renderer: logo + image + text banner compositing
//!
//! This crate builds fixed-size PNG banners out of a logo, a secondary image
//! (local or downloaded) and a line of wrapped text. The secondary image is
//! either lightened into a full-canvas background or pasted on the right.
//!
//! # Example
//!
//! ```no_run
//! use banner_renderer::{BannerAssembler, BannerConfig, BannerRequest};
//!
//! let assembler = BannerAssembler::new(BannerConfig::default())?;
//! let request = BannerRequest::new(
//!     "assets/logos/badge.png",
//!     "https://example.com/photos/cat.png",
//!     "New articles every Monday",
//! )
//! .with_background(false);
//!
//! let png = assembler.generate(&request)?;
//! println!("wrote {}", png.display());
//! # Ok::<(), banner_renderer::BannerError>(())
//! ```
//!
//! # Saved banners
//!
//! [`BannerApp`] adds a JSON-backed [`BannerStore`] so named requests can be
//! listed, re-edited and rendered again:
//!
//! ```no_run
//! use banner_renderer::{BannerApp, BannerConfig};
//!
//! let app = BannerApp::new(BannerConfig::default())?;
//! for record in app.banners() {
//!     println!("{} {}", record.id, record.name);
//! }
//! # Ok::<(), banner_renderer::BannerError>(())
//! ```

mod app;
mod assembler;
mod canvas;
mod composite;
mod config;
mod error;
mod fetch;
mod logos;
mod placement;
mod request;
mod source;
mod store;
mod text;

#[cfg(test)]
mod test_support;

pub use app::BannerApp;
pub use assembler::{BannerAssembler, RenderedBanner};
pub use canvas::{
    BannerLayer, Canvas, CanvasLayout, ImageOptions, LayerOutput, unique_output_path,
};
pub use composite::{composite_over, lighten, stretch, thumbnail};
pub use config::{BannerConfig, parse_color};
pub use error::{BannerError, BannerResult};
pub use fetch::ImageFetcher;
pub use logos::{LogoAsset, discover_logos};
pub use placement::{Placement, SizePx};
pub use request::{BannerRequest, MAX_IMAGE_REF_LEN, MAX_NAME_LEN, MAX_TEXT_LEN};
pub use source::{ImageReference, load_image, render_svg};
pub use store::{BannerRecord, BannerStore};
pub use text::{BannerFont, FontSpec, TextBlock, wrap_text};
