//! Collaborator traits injected into the pipeline.
//!
//! Model inference and calibration live outside this crate; the pipeline
//! only sees these trait objects. Both traits are `Send + Sync` so one
//! pipeline can serve frames from multiple threads.

use std::sync::Arc;

use crate::error::InferenceError;
use crate::image::FrameRgb8;
use crate::mask::Mask;
use crate::roi::RoiRect;

/// One object proposal from an inference collaborator.
///
/// Which fields are present depends on the model family: segmentation models
/// deliver a mask, detectors a box, SAM-style backends both. A detection
/// with neither is useless and is skipped during candidate selection.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Full-frame binary mask, when the backend segments.
    pub mask: Option<Mask>,
    /// Detector bounding box, when the backend localizes.
    pub bbox: Option<RoiRect>,
    /// Model confidence in [0, 1].
    pub confidence: f32,
}

/// External model inference for one frame.
pub trait InferenceBackend: Send + Sync {
    fn detect(&self, frame: &FrameRgb8) -> Result<Vec<Detection>, InferenceError>;
}

impl<T: InferenceBackend + ?Sized> InferenceBackend for Arc<T> {
    fn detect(&self, frame: &FrameRgb8) -> Result<Vec<Detection>, InferenceError> {
        (**self).detect(frame)
    }
}

/// Source of the millimetre-per-pixel ratio at measurement time.
///
/// Returning `None` (or a non-positive ratio) makes the conversion stage
/// fail with `CalibrationUnavailable`; the pipeline never substitutes 1.0.
pub trait ScaleProvider: Send + Sync {
    fn millimeters_per_pixel(&self) -> Option<f32>;
}

/// Constant calibration, for rigs with a fixed camera geometry.
#[derive(Clone, Copy, Debug)]
pub struct FixedScale(pub f32);

impl ScaleProvider for FixedScale {
    fn millimeters_per_pixel(&self) -> Option<f32> {
        (self.0 > 0.0).then_some(self.0)
    }
}
