//! Geometry of images pasted onto a banner canvas.

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is larger than `bounds`.
    pub fn exceeds(&self, bounds: SizePx) -> bool {
        self.width > bounds.width || self.height > bounds.height
    }

    /// Shrinks this size proportionally so it fits within `max_width x max_height`.
    ///
    /// Sizes that already fit are returned unchanged; this never enlarges.
    /// Neither dimension drops below one pixel.
    pub fn fit_within(&self, max_width: f32, max_height: f32) -> SizePx {
        let (w, h) = (self.width as f32, self.height as f32);
        if w <= max_width && h <= max_height {
            return *self;
        }

        let scale = (max_width / w).min(max_height / h);
        SizePx::new(
            ((w * scale).round() as u32).max(1),
            ((h * scale).round() as u32).max(1),
        )
    }
}

/// Where an image landed on the canvas.
///
/// Recorded for every pasted image so later steps (text layout) can avoid
/// drawing over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// Offset from the left edge of the canvas
    pub left: u32,
    /// Offset from the top edge of the canvas
    pub top: u32,
    /// Width of the pasted image
    pub width: u32,
    /// Height of the pasted image
    pub height: u32,
}

impl Placement {
    pub fn new(left: u32, top: u32, size: SizePx) -> Self {
        Self {
            left,
            top,
            width: size.width,
            height: size.height,
        }
    }

    /// Returns the right edge coordinate (left + width).
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    /// Returns the bottom edge coordinate (top + height).
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }
}

/// Minimal right edge across `placements`, or `None` when nothing is placed.
pub fn min_right_edge(placements: &[Placement]) -> Option<u32> {
    placements.iter().map(Placement::right).min()
}
