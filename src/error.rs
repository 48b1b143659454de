//! Typed failure taxonomy for the measurement engine.
//!
//! Terminal conditions surface to the caller as [`MeasureError`]; collaborator
//! failures ([`InferenceError`]) are absorbed inside the pipeline by falling
//! back to the Standard method and never propagate raw out of `measure`.

use thiserror::Error;

/// Errors a measurement call can surface to its caller.
///
/// The engine never fabricates a zero measurement to hide one of these; a
/// failed call carries the reason instead of a number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeasureError {
    /// No usable mask from any source, including the Standard fallback.
    #[error("no candidate mask found above the acceptance floor")]
    NoCandidateFound,

    /// Refinement produced a near-empty foreground.
    #[error("insufficient edge signal: refined foreground below {min_area} px")]
    InsufficientEdgeSignal {
        /// Minimum viable foreground area that was not reached.
        min_area: usize,
    },

    /// Contour point spread is too isotropic to establish a measurement axis.
    #[error("degenerate axis: contour has no stable principal direction")]
    DegenerateAxis,

    /// No valid millimetre-per-pixel ratio was available at conversion time.
    #[error("calibration unavailable: no valid mm/px ratio")]
    CalibrationUnavailable,
}

/// Failures reported by an external inference collaborator.
///
/// Always non-fatal to the pipeline: any of these triggers the Standard
/// fallback for the current call.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The collaborator did not answer within its configured budget.
    #[error("inference timed out")]
    Timeout,

    /// The backend is not loaded or not configured for this method.
    #[error("inference backend unavailable")]
    Unavailable,

    /// The backend answered with a hard error.
    #[error("inference backend failed: {0}")]
    Backend(String),
}
