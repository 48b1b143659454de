#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod profile;
pub mod types;

// Stage modules: public for tools and tests, considered unstable internals.
pub mod arbiter;
pub mod color;
pub mod edges;
pub mod extract;
pub mod mask;
pub mod quality;
pub mod refine;
pub mod roi;
pub mod segment;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pipeline + result.
pub use crate::pipeline::{FixedScale, InferenceBackend, MeasurementPipeline, PipelineParams, ScaleProvider};
pub use crate::types::{MeasureMethod, MeasurementResult, Provenance};

pub use crate::error::{InferenceError, MeasureError};
pub use crate::image::FrameRgb8;
pub use crate::mask::Mask;
pub use crate::roi::RoiRect;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use qc_measure::prelude::*;
///
/// let frame = FrameRgb8::new(640, 480);
/// let pipeline = MeasurementPipeline::new(PipelineParams::default());
/// match pipeline.measure(&frame, MeasureMethod::Standard, &FixedScale(0.42)) {
///     Ok(result) => println!("{:.1} x {:.1} mm", result.length_mm, result.width_mm),
///     Err(err) => eprintln!("no measurement: {err}"),
/// }
/// ```
pub mod prelude {
    pub use crate::error::MeasureError;
    pub use crate::image::FrameRgb8;
    pub use crate::mask::Mask;
    pub use crate::pipeline::{FixedScale, MeasurementPipeline, PipelineParams};
    pub use crate::types::{MeasureMethod, MeasurementResult, Provenance};
}
