use serde::{Deserialize, Serialize};

/// Mask-acquisition strategy configured for a measurement call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureMethod {
    /// Classic contour segmentation on the full frame, no AI collaborator.
    Standard,
    /// FastSAM-style collaborator mask with morphological clean-up.
    FastSam,
    /// Detector box + ROI refinement + IoU arbitration.
    YoloSeg,
    /// Detector box + SAM-style mask with quality gate, no refinement rival.
    Advanced,
}

/// Which strategy produced the mask the measurement was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Standard segmenter output (direct or as AI fallback).
    Standard,
    /// Geometrically refined mask, validated by arbitration.
    Refined,
    /// Learned mask kept because refinement was absent or disagreed.
    AiFallback,
}

/// Immutable outcome of one measurement call.
#[derive(Clone, Debug, Serialize)]
pub struct MeasurementResult {
    pub method: MeasureMethod,
    pub provenance: Provenance,
    /// Long-axis extent in pixels.
    pub length_px: f32,
    /// Short-axis extent in pixels.
    pub width_px: f32,
    pub length_mm: f32,
    pub width_mm: f32,
    /// IoU between learned and refined masks when arbitration ran.
    pub agreement: Option<f32>,
    /// Quality score of the accepted mask when one was computed.
    pub quality: Option<f32>,
    /// Wall-clock time of the whole call.
    pub latency_ms: f64,
    /// Portion spent inside the inference collaborator.
    pub inference_ms: f64,
}
