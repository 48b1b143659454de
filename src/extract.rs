//! Principal-axis endpoint extraction.
//!
//! The measurement axis is the dominant eigenvector of the mask's pixel
//! covariance. Length and width are not taken from the single most extreme
//! boundary pixel, which would inherit full pixel quantization noise:
//! instead the extreme tail of boundary projections is rank-regressed and
//! extrapolated to rank zero, giving a sub-pixel estimate that averages out
//! the quantization of several boundary pixels.
//!
//! A near-isotropic mask has no meaningful axis; the extractor refuses to
//! measure it rather than returning an arbitrary direction.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::MeasureError;
use crate::mask::{largest_contour, Mask};

/// Tuning for the axis and tail estimation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Fraction of boundary points forming each projection tail.
    pub tail_fraction: f32,
    /// Lower bound on the tail size.
    pub min_tail: usize,
    /// Minimum `sqrt(eigmax / eigmin)` for the axis to be trusted.
    pub min_anisotropy: f32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tail_fraction: 0.05,
            min_tail: 3,
            min_anisotropy: 1.15,
        }
    }
}

/// Orthonormal measurement frame anchored at the mask centroid.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct AxisFrame {
    pub center: [f32; 2],
    /// Unit vector along the dominant extent.
    pub major: [f32; 2],
    /// Unit vector orthogonal to `major`.
    pub minor: [f32; 2],
    /// `sqrt(eigmax / eigmin)` of the pixel covariance.
    pub anisotropy: f32,
}

/// Sub-pixel measurement endpoints in frame coordinates.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Endpoints {
    pub axis: AxisFrame,
    /// Extreme points along the major axis.
    pub tip: [f32; 2],
    pub tail: [f32; 2],
    pub length_px: f32,
    pub width_px: f32,
}

/// Extracts the measurement axis and endpoints from a mask.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointExtractor {
    opts: ExtractOptions,
}

/// Least-squares extrapolation of sorted extreme projections to rank zero.
///
/// `tail` holds the most extreme projection first. Fitting `p = a + b·rank`
/// and reading `a` recovers the true extreme with the pixel quantization of
/// the individual boundary samples averaged out.
fn rank_regress_extreme(tail: &[f32]) -> f32 {
    let n = tail.len();
    if n == 1 {
        return tail[0];
    }
    let nf = n as f32;
    let rank_mean = (nf - 1.0) * 0.5;
    let p_mean = tail.iter().sum::<f32>() / nf;
    let mut num = 0.0f32;
    let mut den = 0.0f32;
    for (rank, &p) in tail.iter().enumerate() {
        let dr = rank as f32 - rank_mean;
        num += dr * (p - p_mean);
        den += dr * dr;
    }
    let slope = if den > 0.0 { num / den } else { 0.0 };
    p_mean - slope * rank_mean
}

/// Sub-pixel extent of `projections` along one axis.
///
/// Returns `(min_extreme, max_extreme)`.
fn tail_extent(projections: &mut [f32], tail_fraction: f32, min_tail: usize) -> (f32, f32) {
    projections.sort_by(f32::total_cmp);
    let n = projections.len();
    let k = ((n as f32 * tail_fraction).ceil() as usize)
        .max(min_tail)
        .min(n);
    let low_tail: Vec<f32> = projections[..k].to_vec();
    let mut high_tail: Vec<f32> = projections[n - k..].to_vec();
    high_tail.reverse();
    (
        rank_regress_extreme(&low_tail),
        rank_regress_extreme(&high_tail),
    )
}

impl EndpointExtractor {
    pub fn new(opts: ExtractOptions) -> Self {
        Self { opts }
    }

    /// Measure `mask` along its principal axis.
    pub fn extract(&self, mask: &Mask) -> Result<Endpoints, MeasureError> {
        let centroid = mask.centroid().ok_or(MeasureError::DegenerateAxis)?;
        let contour = largest_contour(mask).ok_or(MeasureError::DegenerateAxis)?;
        if contour.len() < 3 {
            return Err(MeasureError::DegenerateAxis);
        }

        // Covariance over all foreground pixels: more stable than contour
        // points alone, which over-weight ragged boundary stretches.
        let mut sxx = 0.0f64;
        let mut syy = 0.0f64;
        let mut sxy = 0.0f64;
        let mut n = 0usize;
        for y in 0..mask.h {
            for x in 0..mask.w {
                if !mask.get(x, y) {
                    continue;
                }
                let dx = (x as f32 - centroid[0]) as f64;
                let dy = (y as f32 - centroid[1]) as f64;
                sxx += dx * dx;
                syy += dy * dy;
                sxy += dx * dy;
                n += 1;
            }
        }
        if n < 3 {
            return Err(MeasureError::DegenerateAxis);
        }
        let cov = Matrix2::new(
            (sxx / n as f64) as f32,
            (sxy / n as f64) as f32,
            (sxy / n as f64) as f32,
            (syy / n as f64) as f32,
        );
        let eig = cov.symmetric_eigen();
        let (i_max, i_min) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        let eig_max = eig.eigenvalues[i_max].max(0.0);
        let eig_min = eig.eigenvalues[i_min].max(0.0);
        let anisotropy = (eig_max / eig_min.max(1e-9)).sqrt();
        if anisotropy < self.opts.min_anisotropy {
            log::debug!("EndpointExtractor::extract anisotropy {anisotropy:.3} too low");
            return Err(MeasureError::DegenerateAxis);
        }

        let major_v: Vector2<f32> = eig.eigenvectors.column(i_max).into_owned().normalize();
        let major = [major_v.x, major_v.y];
        let minor = [-major_v.y, major_v.x];

        let mut proj_major: Vec<f32> = Vec::with_capacity(contour.len());
        let mut proj_minor: Vec<f32> = Vec::with_capacity(contour.len());
        for p in &contour.points {
            let dx = p[0] - centroid[0];
            let dy = p[1] - centroid[1];
            proj_major.push(dx * major[0] + dy * major[1]);
            proj_minor.push(dx * minor[0] + dy * minor[1]);
        }

        let (lo_major, hi_major) =
            tail_extent(&mut proj_major, self.opts.tail_fraction, self.opts.min_tail);
        let (lo_minor, hi_minor) =
            tail_extent(&mut proj_minor, self.opts.tail_fraction, self.opts.min_tail);

        let tip = [
            centroid[0] + hi_major * major[0],
            centroid[1] + hi_major * major[1],
        ];
        let tail = [
            centroid[0] + lo_major * major[0],
            centroid[1] + lo_major * major[1],
        ];
        let length_px = hi_major - lo_major;
        let width_px = hi_minor - lo_minor;
        log::debug!(
            "EndpointExtractor::extract length={length_px:.2}px width={width_px:.2}px aniso={anisotropy:.2}"
        );

        Ok(Endpoints {
            axis: AxisFrame {
                center: centroid,
                major,
                minor,
                anisotropy,
            },
            tip,
            tail,
            length_px,
            width_px,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotated_rect_mask(w: usize, h: usize, len: f32, wid: f32, angle_deg: f32) -> Mask {
        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let theta = angle_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        Mask::from_fn(w, h, |x, y| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            u.abs() <= len / 2.0 && v.abs() <= wid / 2.0
        })
    }

    #[test]
    fn axis_aligned_rectangle_measures_true_extent() {
        let mask = rotated_rect_mask(260, 140, 200.0, 80.0, 0.0);
        let ep = EndpointExtractor::default().extract(&mask).unwrap();
        assert!((ep.length_px - 200.0).abs() < 2.0, "length {}", ep.length_px);
        assert!((ep.width_px - 80.0).abs() < 2.0, "width {}", ep.width_px);
        assert!(ep.axis.major[0].abs() > 0.99);
    }

    #[test]
    fn rotation_does_not_change_measured_extent() {
        let reference = EndpointExtractor::default()
            .extract(&rotated_rect_mask(300, 300, 200.0, 80.0, 0.0))
            .unwrap();
        for angle in [30.0f32, 45.0, 90.0] {
            let ep = EndpointExtractor::default()
                .extract(&rotated_rect_mask(300, 300, 200.0, 80.0, angle))
                .unwrap();
            assert!(
                (ep.length_px - reference.length_px).abs() < 2.5,
                "angle {angle}: length {} vs {}",
                ep.length_px,
                reference.length_px
            );
            assert!(
                (ep.width_px - reference.width_px).abs() < 2.5,
                "angle {angle}: width {}",
                ep.width_px
            );
        }
    }

    #[test]
    fn tip_and_tail_lie_on_opposite_ends() {
        let mask = rotated_rect_mask(260, 140, 200.0, 80.0, 0.0);
        let ep = EndpointExtractor::default().extract(&mask).unwrap();
        let span = (ep.tip[0] - ep.tail[0]).abs();
        assert!((span - ep.length_px).abs() < 1e-3);
    }

    #[test]
    fn near_circular_mask_is_degenerate() {
        let mask = Mask::from_fn(120, 120, |x, y| {
            let dx = x as f32 - 60.0;
            let dy = y as f32 - 60.0;
            dx * dx + dy * dy <= 40.0 * 40.0
        });
        let err = EndpointExtractor::default().extract(&mask).unwrap_err();
        assert_eq!(err, MeasureError::DegenerateAxis);
    }

    #[test]
    fn tiny_mask_is_degenerate() {
        let mut mask = Mask::new(20, 20);
        mask.set(5, 5, true);
        mask.set(6, 5, true);
        let err = EndpointExtractor::default().extract(&mask).unwrap_err();
        assert_eq!(err, MeasureError::DegenerateAxis);
    }

    #[test]
    fn rank_regression_recovers_linear_extreme() {
        // Samples of a line p = 10 - 0.5*rank with the true extreme at 10.
        let tail = [9.9f32, 9.4, 9.1, 8.6, 8.0];
        let est = rank_regress_extreme(&tail);
        assert!((est - 9.96).abs() < 0.1, "estimate {est}");
    }
}
