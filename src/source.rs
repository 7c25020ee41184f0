//! Image references and decoding.
//!
//! A banner image is named either by a local path or by an `http(s)` URL.
//! Remote references are turned into local files by the
//! [`ImageFetcher`](crate::ImageFetcher); everything is decoded from disk here.
//! Raster formats go through `image`, SVG files are rasterized with resvg at
//! their natural size.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{BannerError, BannerResult};

// ============================================================================
// ImageReference
// ============================================================================

/// Where a banner image comes from.
///
/// ```
/// use banner_renderer::ImageReference;
///
/// let remote = ImageReference::parse("https://example.com/img/cat.png?size=large");
/// assert!(remote.is_remote());
/// assert_eq!(remote.remote_basename().unwrap(), "cat.png");
///
/// let local = ImageReference::parse("assets/logos/badge.png");
/// assert!(!local.is_remote());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// A file on the local filesystem.
    Local(PathBuf),

    /// An `http://` or `https://` URL.
    Remote(String),
}

impl ImageReference {
    /// Classifies a reference string. Anything that is not an http(s) URL is
    /// treated as a local path.
    pub fn parse(reference: &str) -> Self {
        let trimmed = reference.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(trimmed.to_string())
        } else {
            Self::Local(PathBuf::from(trimmed))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Last path segment of a remote URL, without query string or fragment.
    ///
    /// Returns `None` for local references and for URLs whose path ends in `/`.
    pub fn remote_basename(&self) -> Option<&str> {
        let Self::Remote(url) = self else {
            return None;
        };
        let without_fragment = url.split('#').next().unwrap_or(url);
        let without_query = without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment);
        let after_scheme = without_query
            .split_once("://")
            .map_or(without_query, |(_, rest)| rest);
        // Host-only URLs have no path segment to name the file after.
        let (_, path) = after_scheme.split_once('/')?;
        let basename = path.rsplit('/').next()?;
        (!matches!(basename, "" | "." | "..")).then_some(basename)
    }
}

impl From<&str> for ImageReference {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ImageReference {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<PathBuf> for ImageReference {
    fn from(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Opens a local image file as RGBA.
///
/// Missing files are [`BannerError::NotFound`]; unreadable or undecodable
/// content is [`BannerError::Decode`].
pub fn load_image(path: &Path) -> BannerResult<RgbaImage> {
    if !path.is_file() {
        return Err(BannerError::NotFound(path.to_path_buf()));
    }

    if is_svg(path) {
        let svg_data =
            fs::read_to_string(path).map_err(|e| BannerError::decode(path, e))?;
        return render_svg(&svg_data).ok_or_else(|| BannerError::decode(path, "invalid SVG"));
    }

    let decoded = image::open(path).map_err(|e| BannerError::decode(path, e))?;
    Ok(decoded.to_rgba8())
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Renders an SVG string to an RGBA image at its natural size.
///
/// Returns `None` if the SVG cannot be parsed or has an empty size.
pub fn render_svg(svg_data: &str) -> Option<RgbaImage> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).ok()?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Some(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny_skia stores premultiplied alpha
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect x="0" y="0" width="40" height="20" fill="#ff0000"/></svg>"##;

    #[test]
    fn parse_classifies_references() {
        assert_eq!(
            ImageReference::parse("http://example/img.png"),
            ImageReference::Remote("http://example/img.png".into())
        );
        assert!(ImageReference::parse("HTTPS://EXAMPLE/IMG.PNG").is_remote());
        assert_eq!(
            ImageReference::parse(" logo.png "),
            ImageReference::Local(PathBuf::from("logo.png"))
        );
        assert!(!ImageReference::parse("ftp://example/img.png").is_remote());
    }

    #[test]
    fn remote_basename_strips_query_and_fragment() {
        let r = ImageReference::parse("https://cdn.example.com/a/b/pic.jpg?w=100#top");
        assert_eq!(r.remote_basename(), Some("pic.jpg"));

        assert_eq!(ImageReference::parse("http://example/dir/").remote_basename(), None);
        assert_eq!(ImageReference::parse("http://example").remote_basename(), None);
        assert_eq!(ImageReference::parse("http://example/a/..").remote_basename(), None);
        assert_eq!(ImageReference::parse("logo.png").remote_basename(), None);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        match load_image(&missing) {
            Err(BannerError::NotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn load_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(load_image(&path), Err(BannerError::Decode { .. })));
    }

    #[test]
    fn load_png_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(8, 4, Rgba([0, 128, 255, 200]))
            .save(&path)
            .unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(0, 0).0, [0, 128, 255, 200]);
    }

    #[test]
    fn load_svg_rasterizes_at_natural_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.svg");
        fs::write(&path, SIMPLE_SVG).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (40, 20));
        let center = img.get_pixel(20, 10);
        assert!(center[0] > 200 && center[1] < 50, "center should be red, got {center:?}");
    }

    #[test]
    fn invalid_svg_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.svg");
        fs::write(&path, "<svg").unwrap();
        assert!(matches!(load_image(&path), Err(BannerError::Decode { .. })));
    }
}
