//! Axis-aligned regions of interest with margin expansion.

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle within a frame. `x1`/`y1` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl RoiRect {
    pub fn new(x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Full-frame rectangle.
    pub fn full(w: usize, h: usize) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: w,
            y1: h,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Centre of the rectangle in pixel coordinates.
    pub fn center(&self) -> [f32; 2] {
        [
            (self.x0 + self.x1) as f32 * 0.5,
            (self.y0 + self.y1) as f32 * 0.5,
        ]
    }

    /// Intersect with the frame rectangle. A box that lies outside the
    /// frame, or was degenerate to begin with, comes back empty.
    pub fn clamped(&self, frame_w: usize, frame_h: usize) -> Self {
        Self {
            x0: self.x0.min(frame_w),
            y0: self.y0.min(frame_h),
            x1: self.x1.min(frame_w),
            y1: self.y1.min(frame_h),
        }
    }

    /// Expand each side by `margin` of the box extent along that axis and
    /// clamp to the frame bounds. A 0.10 margin grows a box by 10% per side,
    /// keeping object boundaries inside the region handed to refinement.
    pub fn expanded(&self, margin: f32, frame_w: usize, frame_h: usize) -> Self {
        let mx = (self.width() as f32 * margin).round() as usize;
        let my = (self.height() as f32 * margin).round() as usize;
        Self {
            x0: self.x0.saturating_sub(mx),
            y0: self.y0.saturating_sub(my),
            x1: (self.x1 + mx).min(frame_w),
            y1: (self.y1 + my).min(frame_h),
        }
    }
}
