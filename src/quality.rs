//! Shape-plausibility scoring for candidate masks.
//!
//! A plausible footwear silhouette is compact and smooth; segmentation
//! failures produce ragged boundaries, tendrils, or scattered blobs. The
//! score combines two cues, each in [0, 1]:
//!
//! - **smoothness**: perimeter of the mask's equivalent second-moment
//!   ellipse divided by the traced contour perimeter. A ragged contour is
//!   much longer than the ellipse of the same moments, driving the ratio
//!   toward zero.
//! - **solidity**: pixel area divided by the convex-hull area of the
//!   contour. Tendrils and concavities lower it.

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::mask::{convex_hull, largest_contour, polygon_area, Mask};

/// Weights and acceptance floor for the quality score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    pub smoothness_weight: f32,
    pub solidity_weight: f32,
    /// Candidates scoring below this are rejected outright.
    pub floor: f32,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self {
            smoothness_weight: 0.45,
            solidity_weight: 0.55,
            floor: 0.50,
        }
    }
}

/// Score breakdown for one mask.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct QualityScore {
    pub smoothness: f32,
    pub solidity: f32,
    pub score: f32,
}

/// Ramanujan's second approximation of an ellipse perimeter.
fn ellipse_perimeter(a: f32, b: f32) -> f32 {
    let (a, b) = (a.max(0.0), b.max(0.0));
    if a + b < 1e-9 {
        return 0.0;
    }
    let h = ((a - b) / (a + b)).powi(2);
    std::f32::consts::PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
}

/// Semi-axes of the ellipse with the same second central moments as the
/// mask's foreground pixels.
fn equivalent_ellipse_axes(mask: &Mask) -> Option<(f32, f32)> {
    let [cx, cy] = mask.centroid()?;
    let mut sxx = 0.0f64;
    let mut syy = 0.0f64;
    let mut sxy = 0.0f64;
    let mut n = 0usize;
    for y in 0..mask.h {
        for x in 0..mask.w {
            if !mask.get(x, y) {
                continue;
            }
            let dx = (x as f32 - cx) as f64;
            let dy = (y as f32 - cy) as f64;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    let cov = Matrix2::new(
        (sxx / n as f64) as f32,
        (sxy / n as f64) as f32,
        (sxy / n as f64) as f32,
        (syy / n as f64) as f32,
    );
    let eig = cov.symmetric_eigen();
    let l0 = eig.eigenvalues[0].max(0.0);
    let l1 = eig.eigenvalues[1].max(0.0);
    // For a solid ellipse the moment eigenvalue is (semi-axis/2)^2.
    Some((2.0 * l0.max(l1).sqrt(), 2.0 * l0.min(l1).sqrt()))
}

/// Score a mask. Returns zeros for an empty mask or one too small to trace.
pub fn score_mask(mask: &Mask, opts: &QualityOptions) -> QualityScore {
    let zero = QualityScore {
        smoothness: 0.0,
        solidity: 0.0,
        score: 0.0,
    };
    if mask.is_empty() {
        return zero;
    }
    let contour = match largest_contour(mask) {
        Some(c) if c.len() >= 3 => c,
        _ => return zero,
    };
    let contour_perimeter = contour.perimeter();
    if contour_perimeter < 1e-6 {
        return zero;
    }

    let smoothness = match equivalent_ellipse_axes(mask) {
        Some((a, b)) => (ellipse_perimeter(a, b) / contour_perimeter).min(1.0),
        None => 0.0,
    };

    let hull = convex_hull(&contour.points);
    let hull_area = polygon_area(&hull);
    let solidity = if hull_area < 1e-6 {
        0.0
    } else {
        (mask.area() as f32 / hull_area).min(1.0)
    };

    let score = opts.smoothness_weight * smoothness + opts.solidity_weight * solidity;
    log::debug!(
        "quality::score_mask smoothness={smoothness:.3} solidity={solidity:.3} score={score:.3}"
    );
    QualityScore {
        smoothness,
        solidity,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_rect(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> Mask {
        Mask::from_fn(w, h, |x, y| x >= x0 && x < x1 && y >= y0 && y < y1)
    }

    #[test]
    fn empty_mask_scores_zero() {
        let mask = Mask::new(32, 32);
        let s = score_mask(&mask, &QualityOptions::default());
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn solid_rectangle_scores_high() {
        let mask = filled_rect(100, 60, 10, 10, 90, 50);
        let s = score_mask(&mask, &QualityOptions::default());
        assert!(s.solidity > 0.9, "solidity {}", s.solidity);
        assert!(s.smoothness > 0.8, "smoothness {}", s.smoothness);
        assert!(s.score > QualityOptions::default().floor);
    }

    #[test]
    fn background_extent_does_not_affect_score() {
        // Only foreground pixels enter the moment accumulation, so the same
        // shape scores identically regardless of how much background
        // surrounds it.
        let tight = filled_rect(90, 50, 10, 10, 80, 40);
        let padded = filled_rect(300, 200, 10, 10, 80, 40);
        let opts = QualityOptions::default();
        let a = score_mask(&tight, &opts);
        let b = score_mask(&padded, &opts);
        assert!((a.smoothness - b.smoothness).abs() < 1e-6);
        assert!((a.solidity - b.solidity).abs() < 1e-6);
        assert!((a.score - b.score).abs() < 1e-6);
    }

    #[test]
    fn ragged_comb_scores_below_solid_shape() {
        // Comb: rectangle with every other column of the lower half removed.
        let comb = Mask::from_fn(100, 60, |x, y| {
            let inside = (10..90).contains(&x) && (10..50).contains(&y);
            inside && !(y >= 30 && x % 2 == 0)
        });
        let solid = filled_rect(100, 60, 10, 10, 90, 50);
        let opts = QualityOptions::default();
        let ragged = score_mask(&comb, &opts);
        let clean = score_mask(&solid, &opts);
        assert!(ragged.score < clean.score);
        assert!(ragged.solidity < clean.solidity);
    }

    #[test]
    fn disk_is_smoother_than_ragged_star() {
        let disk = Mask::from_fn(80, 80, |x, y| {
            let dx = x as f32 - 40.0;
            let dy = y as f32 - 40.0;
            dx * dx + dy * dy <= 30.0 * 30.0
        });
        let star = Mask::from_fn(80, 80, |x, y| {
            let dx = x as f32 - 40.0;
            let dy = y as f32 - 40.0;
            let r = (dx * dx + dy * dy).sqrt();
            let ang = dy.atan2(dx);
            r <= 18.0 + 12.0 * (8.0 * ang).cos()
        });
        let opts = QualityOptions::default();
        let sd = score_mask(&disk, &opts);
        let ss = score_mask(&star, &opts);
        assert!(sd.smoothness > ss.smoothness);
        assert!(sd.score > ss.score);
    }
}
