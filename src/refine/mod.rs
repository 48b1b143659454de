//! Edge-driven mask refinement inside a margin-expanded ROI.
//!
//! Learned masks localize the object well but their boundary is soft; the
//! measurement needs the physical contour. The refiner rebuilds the mask
//! from image evidence inside the ROI crop:
//!
//! 1. classify the object's color (white-like vs dark/saturated),
//! 2. Sobel gradients on luminance, with the direction-coherence boost so
//!    genuine boundaries survive thresholding,
//! 3. white-like objects rely on edges alone; dark/saturated objects add a
//!    perceptual color-distance mask against the border background estimate,
//! 4. directional closing (horizontal bar, then vertical) bridges boundary
//!    gaps without inflating the orthogonal extent, holes are filled, the
//!    largest component is kept, and a one-pixel erosion compensates the
//!    closing's residual growth.
//!
//! If the surviving component is too small the edge evidence was
//! insufficient and the refiner declines rather than returning a sliver.

use serde::{Deserialize, Serialize};

use crate::color::{classify_color, color_foreground_mask, ColorClass};
use crate::edges::{coherence_boost, sobel_gradients, CoherenceOptions};
use crate::error::MeasureError;
use crate::image::FrameRgb8;
use crate::mask::morphology::{close_directional, erode, fill_holes, Kernel};
use crate::mask::{largest_component, Mask};

/// Tuning for the refinement stages.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineOptions {
    /// Threshold on the (boosted) gradient magnitude.
    pub edge_thresh: f32,
    pub coherence: CoherenceOptions,
    /// Mean-saturation ceiling for the white-like class.
    pub max_white_saturation: f32,
    /// Mean-value floor for the white-like class.
    pub min_white_value: f32,
    /// CIE76 distance from the background estimate that marks foreground.
    pub delta_e_thresh: f32,
    /// Width of the border ring used as the background color sample.
    pub border_ring: usize,
    /// Bar length for the directional closing.
    pub close_len: usize,
    /// Minimum surviving area as a fraction of the crop.
    pub min_area_frac: f32,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            edge_thresh: 0.12,
            coherence: CoherenceOptions::default(),
            max_white_saturation: 0.25,
            min_white_value: 0.55,
            delta_e_thresh: 18.0,
            border_ring: 4,
            close_len: 9,
            min_area_frac: 0.01,
        }
    }
}

/// Refinement output in crop coordinates.
#[derive(Clone, Debug)]
pub struct Refined {
    pub mask: Mask,
    pub color_class: ColorClass,
}

/// Rebuilds object masks from edge and color evidence.
#[derive(Clone, Debug, Default)]
pub struct PrecisionRefiner {
    opts: RefineOptions,
}

impl PrecisionRefiner {
    pub fn new(opts: RefineOptions) -> Self {
        Self { opts }
    }

    /// Refine within `crop`, a margin-expanded ROI cut from the frame.
    pub fn refine(&self, crop: &FrameRgb8) -> Result<Refined, MeasureError> {
        let (w, h) = (crop.width(), crop.height());
        let min_area = ((w * h) as f32 * self.opts.min_area_frac) as usize;

        let color_class = classify_color(
            crop,
            self.opts.max_white_saturation,
            self.opts.min_white_value,
        );
        log::debug!("PrecisionRefiner::refine {w}x{h} class={color_class:?}");

        let luma = crop.to_luma_f32();
        let grad = sobel_gradients(&luma);
        let boosted = coherence_boost(&grad, &self.opts.coherence);

        let mut evidence = Mask::from_fn(w, h, |x, y| boosted.get(x, y) >= self.opts.edge_thresh);

        if color_class == ColorClass::DarkSaturated {
            let color_mask =
                color_foreground_mask(crop, self.opts.border_ring, self.opts.delta_e_thresh);
            log::debug!(
                "PrecisionRefiner::refine color evidence area={}",
                color_mask.area()
            );
            for (e, c) in evidence.data.iter_mut().zip(color_mask.data.iter()) {
                *e |= c;
            }
        }

        let bridged = close_directional(&evidence, self.opts.close_len);
        let solid = fill_holes(&bridged);
        let component =
            largest_component(&solid).ok_or(MeasureError::InsufficientEdgeSignal { min_area })?;
        let trimmed = erode(&component.mask, Kernel::Square(3));

        let area = trimmed.area();
        if area < min_area {
            log::debug!("PrecisionRefiner::refine area {area} below minimum {min_area}");
            return Err(MeasureError::InsufficientEdgeSignal { min_area });
        }
        log::debug!("PrecisionRefiner::refine accepted area={area}");
        Ok(Refined {
            mask: trimmed,
            color_class,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop_with_rect(obj: [u8; 3], bg: [u8; 3]) -> FrameRgb8 {
        let mut crop = FrameRgb8::new(120, 90);
        for y in 0..90 {
            for x in 0..120 {
                let inside = (25..95).contains(&x) && (20..70).contains(&y);
                crop.set(x, y, if inside { obj } else { bg });
            }
        }
        crop
    }

    #[test]
    fn white_object_recovered_from_edges() {
        let crop = crop_with_rect([235, 233, 230], [120, 120, 120]);
        let refined = PrecisionRefiner::default().refine(&crop).unwrap();
        assert_eq!(refined.color_class, ColorClass::WhiteLike);
        assert!(refined.mask.get(60, 45));
        assert!(!refined.mask.get(5, 5));
        let bbox = refined.mask.bounding_box().unwrap();
        // Boundary within a few pixels of the true rectangle.
        assert!((bbox.x0 as i64 - 25).abs() <= 4, "x0 {}", bbox.x0);
        assert!((bbox.x1 as i64 - 95).abs() <= 4, "x1 {}", bbox.x1);
        assert!((bbox.y0 as i64 - 20).abs() <= 4, "y0 {}", bbox.y0);
        assert!((bbox.y1 as i64 - 70).abs() <= 4, "y1 {}", bbox.y1);
    }

    #[test]
    fn dark_object_uses_color_evidence() {
        let crop = crop_with_rect([35, 25, 60], [210, 210, 205]);
        let refined = PrecisionRefiner::default().refine(&crop).unwrap();
        assert_eq!(refined.color_class, ColorClass::DarkSaturated);
        assert!(refined.mask.get(60, 45));
        let area = refined.mask.area() as f32;
        let expected = 70.0 * 50.0;
        assert!((area - expected).abs() / expected < 0.2, "area {area}");
    }

    #[test]
    fn featureless_crop_reports_insufficient_signal() {
        let mut crop = FrameRgb8::new(60, 60);
        for y in 0..60 {
            for x in 0..60 {
                crop.set(x, y, [128, 128, 128]);
            }
        }
        let err = PrecisionRefiner::default().refine(&crop).unwrap_err();
        assert!(matches!(err, MeasureError::InsufficientEdgeSignal { .. }));
    }
}
