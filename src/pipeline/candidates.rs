//! Candidate selection among inference detections.
//!
//! Models return several proposals per frame; the article under the camera
//! is the large one near the frame centre. Tiny proposals are sensor noise
//! or debris, near-full-frame proposals are the background plane. The two
//! scoring schemes differ because detector confidence is only meaningful
//! for box-producing backends.

use serde::{Deserialize, Serialize};

use super::collaborators::Detection;
use crate::mask::Mask;
use crate::roi::RoiRect;

/// Area filters for candidate selection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateOptions {
    /// Mask candidates below this frame-area fraction are noise.
    pub min_area_frac: f32,
    /// Mask candidates above this frame-area fraction are background.
    pub max_area_frac: f32,
    /// Box candidates above this frame-area fraction are background.
    pub box_max_area_frac: f32,
}

impl Default for CandidateOptions {
    fn default() -> Self {
        Self {
            min_area_frac: 0.01,
            max_area_frac: 0.70,
            box_max_area_frac: 0.80,
        }
    }
}

/// Proximity of `point` to the frame centre, 1 at the centre, 0 at the
/// farthest corner.
fn center_proximity(point: [f32; 2], frame_w: usize, frame_h: usize) -> f32 {
    let cx = frame_w as f32 * 0.5;
    let cy = frame_h as f32 * 0.5;
    let max_dist = (cx * cx + cy * cy).sqrt();
    if max_dist <= 0.0 {
        return 0.0;
    }
    let dx = point[0] - cx;
    let dy = point[1] - cy;
    1.0 - ((dx * dx + dy * dy).sqrt() / max_dist).min(1.0)
}

/// Best segmentation candidate, scored `0.7·area + 0.3·centre`.
///
/// Detections without a mask, or whose mask area falls outside
/// `[min_area_frac, max_area_frac]` of the frame, do not compete. The
/// detector box accompanies the winning mask when the backend supplied one.
pub fn best_mask_candidate(
    detections: &[Detection],
    frame_w: usize,
    frame_h: usize,
    opts: &CandidateOptions,
) -> Option<(Mask, Option<RoiRect>)> {
    let frame_area = frame_w * frame_h;
    let mut best: Option<(f32, &Mask, Option<RoiRect>)> = None;
    for det in detections {
        let Some(mask) = det.mask.as_ref() else {
            continue;
        };
        let frac = mask.area_fraction(frame_area);
        if frac < opts.min_area_frac || frac > opts.max_area_frac {
            continue;
        }
        let Some(centroid) = mask.centroid() else {
            continue;
        };
        let score = 0.7 * frac + 0.3 * center_proximity(centroid, frame_w, frame_h);
        if best.as_ref().map_or(true, |(s, _, _)| score > *s) {
            best = Some((score, mask, det.bbox));
        }
    }
    if let Some((score, _, _)) = &best {
        log::debug!("candidates::best_mask_candidate score={score:.3}");
    }
    best.map(|(_, mask, bbox)| (mask.clone(), bbox))
}

/// Best box-producing candidate, scored
/// `0.4·area + 0.3·centre + 0.3·confidence`.
///
/// Returns the whole detection so the caller can use its mask alongside the
/// box. Boxes are clamped to the frame first; boxes that end up empty or
/// above `box_max_area_frac` of the frame do not compete.
pub fn best_box_candidate(
    detections: &[Detection],
    frame_w: usize,
    frame_h: usize,
    opts: &CandidateOptions,
) -> Option<(RoiRect, Detection)> {
    let frame_area = frame_w * frame_h;
    let mut best: Option<(f32, RoiRect, &Detection)> = None;
    for det in detections {
        let Some(bbox) = det.bbox else { continue };
        let bbox = bbox.clamped(frame_w, frame_h);
        if bbox.is_empty() {
            continue;
        }
        let frac = bbox.area() as f32 / frame_area.max(1) as f32;
        if frac > opts.box_max_area_frac {
            continue;
        }
        let score = 0.4 * frac
            + 0.3 * center_proximity(bbox.center(), frame_w, frame_h)
            + 0.3 * det.confidence.clamp(0.0, 1.0);
        if best.as_ref().map_or(true, |(s, _, _)| score > *s) {
            best = Some((score, bbox, det));
        }
    }
    if let Some((score, bbox, _)) = &best {
        log::debug!("candidates::best_box_candidate score={score:.3} box={bbox:?}");
    }
    best.map(|(_, bbox, det)| (bbox, det.clone()))
}
