//! Adaptive mean thresholding backed by a summed-area table.

use crate::image::{ImageF32, ImageView};
use crate::mask::Mask;

/// Which side of the local mean counts as foreground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Foreground darker than its surroundings.
    Dark,
    /// Foreground brighter than its surroundings.
    Bright,
}

/// Summed-area table with one extra row/column of zeros, so any window sum
/// is four lookups.
pub struct Integral {
    w: usize,
    h: usize,
    sums: Vec<f64>,
}

impl Integral {
    pub fn build(img: &ImageF32) -> Self {
        let (w, h) = (img.w, img.h);
        let stride = w + 1;
        let mut sums = vec![0.0f64; stride * (h + 1)];
        for y in 0..h {
            let row = img.row(y);
            let mut acc = 0.0f64;
            for x in 0..w {
                acc += row[x] as f64;
                sums[(y + 1) * stride + (x + 1)] = sums[y * stride + (x + 1)] + acc;
            }
        }
        Self { w, h, sums }
    }

    /// Mean over the clamped window `[x-r, x+r] × [y-r, y+r]`.
    pub fn window_mean(&self, x: usize, y: usize, r: usize) -> f32 {
        let x0 = x.saturating_sub(r);
        let y0 = y.saturating_sub(r);
        let x1 = (x + r + 1).min(self.w);
        let y1 = (y + r + 1).min(self.h);
        let stride = self.w + 1;
        let sum = self.sums[y1 * stride + x1] - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0]
            + self.sums[y0 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        (sum / count) as f32
    }
}

/// Threshold every pixel against the mean of its local window.
///
/// A pixel is foreground when it deviates from the window mean by more than
/// `offset` on the side selected by `polarity`. The local mean adapts to
/// illumination gradients that defeat any single global threshold.
pub fn adaptive_mean_threshold(
    img: &ImageF32,
    radius: usize,
    offset: f32,
    polarity: Polarity,
) -> Mask {
    let integral = Integral::build(img);
    let mut mask = Mask::new(img.w, img.h);
    for y in 0..img.h {
        let row = img.row(y);
        for x in 0..img.w {
            let mean = integral.window_mean(x, y, radius);
            let fg = match polarity {
                Polarity::Dark => row[x] < mean - offset,
                Polarity::Bright => row[x] > mean + offset,
            };
            if fg {
                mask.set(x, y, true);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn integral_window_mean_matches_direct_sum() {
        let mut img = ImageF32::new(12, 9);
        for y in 0..9 {
            for x in 0..12 {
                img.set(x, y, (x * 3 + y) as f32 * 0.01);
            }
        }
        let integral = Integral::build(&img);
        for &(x, y, r) in &[(0usize, 0usize, 2usize), (5, 4, 3), (11, 8, 1)] {
            let x0 = x.saturating_sub(r);
            let y0 = y.saturating_sub(r);
            let x1 = (x + r + 1).min(12);
            let y1 = (y + r + 1).min(9);
            let mut sum = 0.0;
            for yy in y0..y1 {
                for xx in x0..x1 {
                    sum += img.get(xx, yy);
                }
            }
            let direct = sum / ((x1 - x0) * (y1 - y0)) as f32;
            assert!((integral.window_mean(x, y, r) - direct).abs() < 1e-4);
        }
    }

    #[test]
    fn dark_object_found_despite_illumination_ramp() {
        // Brightness ramps left to right; a dark square sits mid-frame.
        let mut img = ImageF32::new(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                let base = 0.3 + 0.4 * x as f32 / 63.0;
                let v = if (20..44).contains(&x) && (20..44).contains(&y) {
                    base - 0.25
                } else {
                    base
                };
                img.set(x, y, v);
            }
        }
        let mask = adaptive_mean_threshold(&img, 15, 0.05, Polarity::Dark);
        assert!(mask.get(32, 32), "object interior must be foreground");
        assert!(!mask.get(5, 5), "ramp background must stay background");
        assert!(!mask.get(60, 60));
    }

    #[test]
    fn polarity_selects_bright_objects() {
        let mut img = ImageF32::new(40, 40);
        for y in 15..25 {
            for x in 15..25 {
                img.set(x, y, 0.9);
            }
        }
        let bright = adaptive_mean_threshold(&img, 10, 0.05, Polarity::Bright);
        let dark = adaptive_mean_threshold(&img, 10, 0.05, Polarity::Dark);
        assert!(bright.get(20, 20));
        assert!(!dark.get(20, 20));
    }
}
