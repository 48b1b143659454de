//! Classical contour segmentation, the baseline mask acquisition path.
//!
//! No learned model is involved: the luminance plane is adaptively
//! thresholded in the polarity implied by the frame's contrast sign (both
//! when ambiguous), each thresholded mask is cleaned up morphologically, and
//! every surviving connected component is ranked by the shape-plausibility
//! score. The best-scoring component wins; if nothing clears the quality
//! floor the segmenter reports no candidate.

pub mod adaptive;

pub use adaptive::{adaptive_mean_threshold, Integral, Polarity};

use serde::{Deserialize, Serialize};

use crate::error::MeasureError;
use crate::image::ImageF32;
use crate::mask::morphology::{close, fill_holes, Kernel};
use crate::mask::{connected_components, Mask};
use crate::quality::{score_mask, QualityOptions, QualityScore};

/// Tuning for the classical segmenter.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// Half-size of the adaptive threshold window.
    pub window_radius: usize,
    /// Deviation from the local mean required to mark foreground.
    pub offset: f32,
    /// Components smaller than this fraction of the image are discarded.
    pub min_area_frac: f32,
    /// Square closing kernel applied to each thresholded mask.
    pub close_size: usize,
    pub quality: QualityOptions,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            window_radius: 25,
            offset: 0.04,
            min_area_frac: 0.01,
            close_size: 5,
            quality: QualityOptions::default(),
        }
    }
}

/// Winning mask with its score breakdown.
#[derive(Clone, Debug)]
pub struct Segmented {
    pub mask: Mask,
    pub quality: QualityScore,
}

/// Threshold-based segmenter over a single-channel luminance image.
#[derive(Clone, Debug, Default)]
pub struct StandardSegmenter {
    opts: SegmentOptions,
}

impl StandardSegmenter {
    pub fn new(opts: SegmentOptions) -> Self {
        Self { opts }
    }

    /// Polarity implied by the contrast sign between the border ring and
    /// the frame centre, or `None` when the frame is too flat to tell.
    ///
    /// Thresholding the wrong polarity on a high-contrast frame produces a
    /// halo ring around the object that survives closing and hole filling
    /// as a plausible-looking blob, so the ambiguous both-polarity sweep is
    /// reserved for genuinely ambiguous frames.
    fn implied_polarity(&self, luma: &ImageF32) -> Option<Polarity> {
        let (w, h) = (luma.w, luma.h);
        if w < 8 || h < 8 {
            return None;
        }
        let ring = (w.min(h) / 16).max(2);
        let mut border = (0.0f64, 0usize);
        let mut center = (0.0f64, 0usize);
        for y in 0..h {
            for x in 0..w {
                let v = luma.get(x, y) as f64;
                if x < ring || y < ring || x + ring >= w || y + ring >= h {
                    border.0 += v;
                    border.1 += 1;
                } else if (w / 4..3 * w / 4).contains(&x) && (h / 4..3 * h / 4).contains(&y) {
                    center.0 += v;
                    center.1 += 1;
                }
            }
        }
        if border.1 == 0 || center.1 == 0 {
            return None;
        }
        let diff = (center.0 / center.1 as f64 - border.0 / border.1 as f64) as f32;
        if diff <= -self.opts.offset {
            Some(Polarity::Dark)
        } else if diff >= self.opts.offset {
            Some(Polarity::Bright)
        } else {
            None
        }
    }

    /// Extract the most plausible object mask from `luma`.
    pub fn segment(&self, luma: &ImageF32) -> Result<Segmented, MeasureError> {
        let total = luma.w * luma.h;
        let min_area = ((total as f32 * self.opts.min_area_frac) as usize).max(1);

        let polarities: &[Polarity] = match self.implied_polarity(luma) {
            Some(Polarity::Dark) => &[Polarity::Dark],
            Some(Polarity::Bright) => &[Polarity::Bright],
            None => &[Polarity::Dark, Polarity::Bright],
        };

        let mut best: Option<Segmented> = None;
        for &polarity in polarities {
            let raw = adaptive_mean_threshold(
                luma,
                self.opts.window_radius,
                self.opts.offset,
                polarity,
            );
            let cleaned = fill_holes(&close(&raw, Kernel::Square(self.opts.close_size)));
            let components = connected_components(&cleaned, min_area);
            log::debug!(
                "StandardSegmenter::segment polarity={polarity:?} components={}",
                components.len()
            );
            for comp in components {
                let quality = score_mask(&comp.mask, &self.opts.quality);
                let better = best
                    .as_ref()
                    .map_or(true, |b| quality.score > b.quality.score);
                if better {
                    best = Some(Segmented {
                        mask: comp.mask,
                        quality,
                    });
                }
            }
        }

        match best {
            Some(seg) if seg.quality.score >= self.opts.quality.floor => {
                log::debug!(
                    "StandardSegmenter::segment accepted score={:.3} area={}",
                    seg.quality.score,
                    seg.mask.area()
                );
                Ok(seg)
            }
            Some(seg) => {
                log::debug!(
                    "StandardSegmenter::segment best score {:.3} below floor {:.2}",
                    seg.quality.score,
                    self.opts.quality.floor
                );
                Err(MeasureError::NoCandidateFound)
            }
            None => Err(MeasureError::NoCandidateFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn frame_with_dark_rect() -> ImageF32 {
        let mut img = ImageF32::new(120, 90);
        for y in 0..90 {
            for x in 0..120 {
                let v = if (30..90).contains(&x) && (25..65).contains(&y) {
                    0.15
                } else {
                    0.75
                };
                img.set(x, y, v);
            }
        }
        img
    }

    #[test]
    fn dark_rectangle_is_segmented() {
        let img = frame_with_dark_rect();
        let seg = StandardSegmenter::default().segment(&img).unwrap();
        assert!(seg.mask.get(60, 45));
        assert!(!seg.mask.get(5, 5));
        // Area close to the 60 x 40 rectangle.
        let area = seg.mask.area() as f32;
        assert!((area - 2400.0).abs() / 2400.0 < 0.15, "area {area}");
        assert!(seg.quality.score >= SegmentOptions::default().quality.floor);
    }

    #[test]
    fn flat_frame_yields_no_candidate() {
        let mut img = ImageF32::new(80, 80);
        for y in 0..80 {
            for x in 0..80 {
                img.set(x, y, 0.5);
            }
        }
        let err = StandardSegmenter::default().segment(&img).unwrap_err();
        assert_eq!(err, MeasureError::NoCandidateFound);
    }

    #[test]
    fn bright_object_on_dark_background_is_found() {
        let mut img = ImageF32::new(100, 100);
        for y in 0..100 {
            for x in 0..100 {
                let v = if (20..80).contains(&x) && (35..70).contains(&y) {
                    0.85
                } else {
                    0.2
                };
                img.set(x, y, v);
            }
        }
        let seg = StandardSegmenter::default().segment(&img).unwrap();
        assert!(seg.mask.get(50, 50));
    }
}
