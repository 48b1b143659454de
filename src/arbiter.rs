//! Arbitration between a learned mask and its edge-refined counterpart.
//!
//! The refined mask is preferred when it corroborates the learned one:
//! high overlap means the refiner traced the same object and its boundary is
//! the more precise of the two. Low overlap means the refiner latched onto
//! something else, and the learned mask is the safer choice. A learned mask
//! covering most of the frame is a segmentation blow-up and is rejected
//! before any comparison.

use serde::{Deserialize, Serialize};

use crate::error::MeasureError;
use crate::mask::Mask;
use crate::types::Provenance;

/// Thresholds for the arbitration decision.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterOptions {
    /// A learned mask covering more than this fraction of the frame is
    /// treated as a segmentation failure.
    pub max_area_frac: f32,
    /// Minimum IoU for the refined mask to replace the learned one.
    pub iou_accept: f32,
}

impl Default for ArbiterOptions {
    fn default() -> Self {
        Self {
            max_area_frac: 0.70,
            iou_accept: 0.60,
        }
    }
}

/// Arbitration outcome: the mask to measure and where it came from.
#[derive(Clone, Debug)]
pub struct Arbitration {
    pub mask: Mask,
    pub provenance: Provenance,
    /// IoU between learned and refined masks, when both were available.
    pub agreement: Option<f32>,
}

/// Decides which mask the measurement is taken from.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaskArbiter {
    opts: ArbiterOptions,
}

impl MaskArbiter {
    pub fn new(opts: ArbiterOptions) -> Self {
        Self { opts }
    }

    /// Arbitrate between `learned` and an optional `refined` mask, both in
    /// full-frame coordinates.
    pub fn arbitrate(
        &self,
        learned: Mask,
        refined: Option<Mask>,
    ) -> Result<Arbitration, MeasureError> {
        let frame_area = learned.w * learned.h;
        let learned_frac = learned.area_fraction(frame_area);

        if learned_frac > self.opts.max_area_frac {
            log::debug!(
                "MaskArbiter::arbitrate learned mask covers {:.0}% of frame, rejected",
                learned_frac * 100.0
            );
            // The learned mask is unusable; the refined mask can still carry
            // the measurement on its own.
            return match refined {
                Some(mask) if !mask.is_empty() => Ok(Arbitration {
                    mask,
                    provenance: Provenance::Refined,
                    agreement: None,
                }),
                _ => Err(MeasureError::NoCandidateFound),
            };
        }

        let Some(refined) = refined else {
            log::debug!("MaskArbiter::arbitrate no refined mask, falling back to learned");
            return Ok(Arbitration {
                mask: learned,
                provenance: Provenance::AiFallback,
                agreement: None,
            });
        };

        let iou = learned.iou(&refined);
        if iou >= self.opts.iou_accept {
            log::debug!("MaskArbiter::arbitrate iou={iou:.3} accepted refined mask");
            Ok(Arbitration {
                mask: refined,
                provenance: Provenance::Refined,
                agreement: Some(iou),
            })
        } else {
            log::debug!(
                "MaskArbiter::arbitrate iou={iou:.3} below {:.2}, keeping learned mask",
                self.opts.iou_accept
            );
            Ok(Arbitration {
                mask: learned,
                provenance: Provenance::AiFallback,
                agreement: Some(iou),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiRect;

    fn block(w: usize, h: usize, r: RoiRect) -> Mask {
        Mask::from_fn(w, h, |x, y| x >= r.x0 && x < r.x1 && y >= r.y0 && y < r.y1)
    }

    #[test]
    fn agreeing_refined_mask_wins() {
        let learned = block(100, 100, RoiRect::new(20, 20, 80, 80));
        let refined = block(100, 100, RoiRect::new(21, 21, 79, 79));
        let arb = MaskArbiter::default()
            .arbitrate(learned, Some(refined.clone()))
            .unwrap();
        assert_eq!(arb.provenance, Provenance::Refined);
        assert_eq!(arb.mask, refined);
        assert!(arb.agreement.unwrap() > 0.9);
    }

    #[test]
    fn disagreeing_refined_mask_falls_back_to_learned() {
        let learned = block(100, 100, RoiRect::new(10, 10, 50, 50));
        let refined = block(100, 100, RoiRect::new(60, 60, 95, 95));
        let arb = MaskArbiter::default()
            .arbitrate(learned.clone(), Some(refined))
            .unwrap();
        assert_eq!(arb.provenance, Provenance::AiFallback);
        assert_eq!(arb.mask, learned);
        assert!(arb.agreement.unwrap() < 0.1);
    }

    #[test]
    fn oversized_learned_mask_is_rejected() {
        // 85% coverage.
        let learned = block(100, 100, RoiRect::new(5, 5, 97, 97));
        let refined = block(100, 100, RoiRect::new(30, 30, 70, 70));
        let arb = MaskArbiter::default()
            .arbitrate(learned, Some(refined.clone()))
            .unwrap();
        assert_eq!(arb.provenance, Provenance::Refined);
        assert_eq!(arb.mask, refined);
        assert!(arb.agreement.is_none());
    }

    #[test]
    fn oversized_learned_mask_without_refined_is_an_error() {
        let learned = block(100, 100, RoiRect::new(5, 5, 97, 97));
        let err = MaskArbiter::default().arbitrate(learned, None).unwrap_err();
        assert_eq!(err, MeasureError::NoCandidateFound);
    }

    #[test]
    fn missing_refined_mask_keeps_learned() {
        let learned = block(100, 100, RoiRect::new(20, 20, 60, 60));
        let arb = MaskArbiter::default()
            .arbitrate(learned.clone(), None)
            .unwrap();
        assert_eq!(arb.provenance, Provenance::AiFallback);
        assert_eq!(arb.mask, learned);
        assert!(arb.agreement.is_none());
    }

    #[test]
    fn iou_exactly_at_threshold_accepts_refined() {
        // intersection 30*25 = 750, union 50*25 = 1250, IoU exactly 0.6
        let learned = block(100, 100, RoiRect::new(0, 0, 40, 25));
        let refined = block(100, 100, RoiRect::new(10, 0, 50, 25));
        let arb = MaskArbiter::default()
            .arbitrate(learned, Some(refined.clone()))
            .unwrap();
        assert_eq!(arb.provenance, Provenance::Refined);
        assert!((arb.agreement.unwrap() - 0.6).abs() < 1e-6);
    }
}
