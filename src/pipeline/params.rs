//! Aggregated pipeline configuration.

use serde::{Deserialize, Serialize};

use super::candidates::CandidateOptions;
use crate::arbiter::ArbiterOptions;
use crate::extract::ExtractOptions;
use crate::quality::QualityOptions;
use crate::refine::RefineOptions;
use crate::segment::SegmentOptions;

/// Every tunable of the measurement pipeline, one nested struct per stage.
///
/// All fields have working defaults; a deployment overrides the few it
/// cares about via the serde representation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub segment: SegmentOptions,
    pub refine: RefineOptions,
    pub arbiter: ArbiterOptions,
    pub extract: ExtractOptions,
    pub quality: QualityOptions,
    pub candidates: CandidateOptions,
    pub method: MethodParams,
}

/// Per-method constants of the dispatch layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodParams {
    /// Square erosion kernel applied to FastSAM masks.
    pub fastsam_erode_size: usize,
    /// Erosion passes removing the FastSAM halo (~2 px of bleed each).
    pub fastsam_erode_iters: usize,
    /// ROI margin per side for the YOLO-Seg refinement crop.
    pub yolo_margin: f32,
    /// ROI margin per side for the Advanced clean-up crop.
    pub advanced_margin: f32,
    /// Square kernel for the Advanced close + open clean-up.
    pub advanced_clean_size: usize,
    /// Quality gate on the Advanced learned mask when a detector box exists.
    pub advanced_gate: f32,
    /// Relaxed gate for the point-prompt path and the dark-object rescue.
    pub advanced_gate_relaxed: f32,
}

impl Default for MethodParams {
    fn default() -> Self {
        Self {
            fastsam_erode_size: 5,
            fastsam_erode_iters: 3,
            yolo_margin: 0.10,
            advanced_margin: 0.05,
            advanced_clean_size: 3,
            advanced_gate: 0.60,
            advanced_gate_relaxed: 0.45,
        }
    }
}
