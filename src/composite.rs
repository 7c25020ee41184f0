//! Pixel compositing helpers used by the canvas.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::placement::SizePx;

// ============================================================================
// Blending
// ============================================================================

/// Composites a source image onto a destination image at the specified position.
///
/// Uses standard alpha blending (source over destination), so the source's own
/// alpha channel acts as the paste mask.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let dest_width = dest.width() as i64;
    let dest_height = dest.height() as i64;

    for (sx, sy, src_pixel) in src.enumerate_pixels() {
        let dx = x + sx as i64;
        let dy = y + sy as i64;

        if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
            continue;
        }

        let dst_pixel = dest.get_pixel_mut(dx as u32, dy as u32);
        *dst_pixel = alpha_blend(*src_pixel, *dst_pixel);
    }
}

/// Copies `src` over `dest` at the given position, alpha included.
pub fn replace(dest: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    imageops::replace(dest, src, x, y);
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Lays a translucent white sheet over the whole image.
///
/// Used on background images so dark text stays legible on top of them.
pub fn lighten(img: &RgbaImage, overlay_alpha: u8) -> RgbaImage {
    let sheet = Rgba([255, 255, 255, overlay_alpha]);
    let mut result = img.clone();
    for pixel in result.pixels_mut() {
        *pixel = alpha_blend(sheet, *pixel);
    }
    result
}

// ============================================================================
// Resizing
// ============================================================================

/// Shrinks an image proportionally to fit `max_width x max_height`.
///
/// Images that already fit are returned as-is.
pub fn thumbnail(img: RgbaImage, max_width: f32, max_height: f32) -> RgbaImage {
    let current = SizePx::new(img.width(), img.height());
    let target = current.fit_within(max_width, max_height);
    if target == current {
        return img;
    }
    imageops::resize(&img, target.width, target.height, FilterType::Lanczos3)
}

/// Scales an image to exactly `size`, ignoring its aspect ratio.
pub fn stretch(img: &RgbaImage, size: SizePx) -> RgbaImage {
    if img.dimensions() == (size.width, size.height) {
        return img.clone();
    }
    imageops::resize(img, size.width, size.height, FilterType::Lanczos3)
}
