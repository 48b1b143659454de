//! Pass/fail tolerance checks and production size grading.
//!
//! A measured article is compared against the profile of its nominal size.
//! Grading works in size units rather than millimetres because the
//! production scale is graded in thirds of a centimetre: one size unit is
//! 2/3 cm. An article may legitimately shrink further during later process
//! steps, so oversize articles up to 1.5 units are routed onward rather
//! than rejected, while any undersize article is scrap.

use serde::{Deserialize, Serialize};

use crate::types::MeasurementResult;

/// Millimetres per size unit (2/3 cm).
pub const MM_PER_SIZE_UNIT: f32 = 20.0 / 3.0;

/// Expected dimensions with symmetric tolerances, all in millimetres.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ToleranceProfile {
    pub nominal_length_mm: f32,
    pub nominal_width_mm: f32,
    pub length_tol_mm: f32,
    pub width_tol_mm: f32,
}

impl ToleranceProfile {
    /// Both dimensions within their tolerance band.
    pub fn check(&self, result: &MeasurementResult) -> bool {
        (result.length_mm - self.nominal_length_mm).abs() <= self.length_tol_mm
            && (result.width_mm - self.nominal_width_mm).abs() <= self.width_tol_mm
    }

    /// Signed deviation of the measured length from nominal, in size units.
    pub fn length_deviation_units(&self, result: &MeasurementResult) -> f32 {
        (result.length_mm - self.nominal_length_mm) / MM_PER_SIZE_UNIT
    }

    /// Grade a result by its length deviation.
    pub fn grade(&self, result: &MeasurementResult) -> SizeGrade {
        SizeGrade::from_deviation(self.length_deviation_units(result))
    }
}

/// Production routing decision by size deviation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeGrade {
    /// On size, ship as-is.
    Good1,
    /// Slightly over, still within shipping tolerance.
    Good2,
    /// Oversize, one shrink cycle.
    Oven1,
    /// Strongly oversize, two shrink cycles.
    Oven2,
    /// Undersize or beyond recoverable oversize.
    Reject,
}

impl SizeGrade {
    /// Grade from a signed deviation in size units.
    pub fn from_deviation(units: f32) -> SizeGrade {
        if units < 0.0 || units >= 1.5 {
            SizeGrade::Reject
        } else if units < 0.25 {
            SizeGrade::Good1
        } else if units < 0.5 {
            SizeGrade::Good2
        } else if units < 1.0 {
            SizeGrade::Oven1
        } else {
            SizeGrade::Oven2
        }
    }
}
