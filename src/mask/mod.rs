//! Binary foreground masks and the geometry derived from them.
//!
//! A [`Mask`] is a dense 0/1 grid covering a frame or a ROI crop of it; it
//! never aliases the frame buffer. Submodules derive structure from masks:
//! connected components and boundary contours ([`contour`]), convex hulls
//! ([`hull`]) and morphological operators ([`morphology`]).

pub mod contour;
pub mod hull;
pub mod morphology;

pub use contour::{
    connected_components, largest_component, largest_contour, trace_boundary, Component, Contour,
};
pub use hull::{convex_hull, polygon_area};

use crate::roi::RoiRect;

/// Dense binary mask, row-major, one byte per pixel (0 background, 1 foreground).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl Mask {
    /// All-background mask of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0u8; w * h],
        }
    }

    /// Build a mask from a per-pixel predicate.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut m = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                if f(x, y) {
                    m.data[y * w + x] = 1;
                }
            }
        }
        m
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: bool) {
        self.data[y * self.w + x] = v as u8;
    }

    /// Number of foreground pixels.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Foreground area as a fraction of `total_area` pixels.
    pub fn area_fraction(&self, total_area: usize) -> f32 {
        if total_area == 0 {
            0.0
        } else {
            self.area() as f32 / total_area as f32
        }
    }

    /// Mean foreground coordinate, or `None` for an empty mask.
    pub fn centroid(&self) -> Option<[f32; 2]> {
        let mut n = 0usize;
        let mut sx = 0.0f64;
        let mut sy = 0.0f64;
        for y in 0..self.h {
            let row = &self.data[y * self.w..(y + 1) * self.w];
            for (x, &v) in row.iter().enumerate() {
                if v != 0 {
                    sx += x as f64;
                    sy += y as f64;
                    n += 1;
                }
            }
        }
        (n > 0).then(|| [(sx / n as f64) as f32, (sy / n as f64) as f32])
    }

    /// Intersection-over-Union against `other`.
    ///
    /// Both masks must share the same spatial extent; a mismatch is a
    /// programming error upstream, not a runtime condition.
    pub fn iou(&self, other: &Mask) -> f32 {
        assert_eq!(
            (self.w, self.h),
            (other.w, other.h),
            "IoU requires identical mask extents"
        );
        let mut inter = 0usize;
        let mut union = 0usize;
        for (&a, &b) in self.data.iter().zip(other.data.iter()) {
            let fa = a != 0;
            let fb = b != 0;
            if fa && fb {
                inter += 1;
            }
            if fa || fb {
                union += 1;
            }
        }
        if union == 0 {
            0.0
        } else {
            inter as f32 / union as f32
        }
    }

    /// Copy the sub-rectangle `roi` into a new mask. `roi` must lie inside
    /// this mask's extent.
    pub fn crop(&self, roi: RoiRect) -> Mask {
        assert!(
            roi.x1 <= self.w && roi.y1 <= self.h && !roi.is_empty(),
            "crop ROI out of bounds"
        );
        let (cw, ch) = (roi.width(), roi.height());
        let mut out = Mask::new(cw, ch);
        for y in 0..ch {
            let src = (roi.y0 + y) * self.w + roi.x0;
            out.data[y * cw..(y + 1) * cw].copy_from_slice(&self.data[src..src + cw]);
        }
        out
    }

    /// Place this mask into an all-background `w × h` mask at the position
    /// `roi`, mapping ROI-space output back into frame coordinates. The ROI
    /// extent must match this mask and lie inside `w × h`.
    pub fn embed(&self, w: usize, h: usize, roi: RoiRect) -> Mask {
        assert_eq!((self.w, self.h), (roi.width(), roi.height()));
        assert!(roi.x1 <= w && roi.y1 <= h);
        let mut out = Mask::new(w, h);
        for y in 0..self.h {
            let dst = (roi.y0 + y) * w + roi.x0;
            out.data[dst..dst + self.w].copy_from_slice(&self.data[y * self.w..(y + 1) * self.w]);
        }
        out
    }

    /// Tight bounding rectangle of the foreground, or `None` when empty.
    pub fn bounding_box(&self) -> Option<RoiRect> {
        let mut x0 = usize::MAX;
        let mut y0 = usize::MAX;
        let mut x1 = 0usize;
        let mut y1 = 0usize;
        let mut any = false;
        for y in 0..self.h {
            let row = &self.data[y * self.w..(y + 1) * self.w];
            for (x, &v) in row.iter().enumerate() {
                if v != 0 {
                    any = true;
                    x0 = x0.min(x);
                    y0 = y0.min(y);
                    x1 = x1.max(x + 1);
                    y1 = y1.max(y + 1);
                }
            }
        }
        any.then(|| RoiRect::new(x0, y0, x1, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(w: usize, h: usize, r: RoiRect) -> Mask {
        Mask::from_fn(w, h, |x, y| x >= r.x0 && x < r.x1 && y >= r.y0 && y < r.y1)
    }

    #[test]
    fn iou_of_identical_masks_is_one() {
        let m = block(20, 20, RoiRect::new(5, 5, 15, 15));
        assert!((m.iou(&m) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_masks_is_zero() {
        let a = block(20, 20, RoiRect::new(0, 0, 5, 5));
        let b = block(20, 20, RoiRect::new(10, 10, 20, 20));
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_half_overlap() {
        let a = block(20, 20, RoiRect::new(0, 0, 10, 20));
        let b = block(20, 20, RoiRect::new(5, 0, 15, 20));
        // intersection 5*20, union 15*20
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic]
    fn iou_extent_mismatch_panics() {
        let a = Mask::new(10, 10);
        let b = Mask::new(12, 10);
        let _ = a.iou(&b);
    }

    #[test]
    fn centroid_of_block() {
        let m = block(20, 20, RoiRect::new(4, 6, 8, 10));
        let c = m.centroid().unwrap();
        assert!((c[0] - 5.5).abs() < 1e-4);
        assert!((c[1] - 7.5).abs() < 1e-4);
    }

    #[test]
    fn bounding_box_matches_block() {
        let r = RoiRect::new(3, 2, 9, 11);
        let m = block(16, 16, r);
        assert_eq!(m.bounding_box().unwrap(), r);
    }
}
