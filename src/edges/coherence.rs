//! Gradient-direction coherence boost.
//!
//! Real object boundaries are elongated: neighbouring edge pixels point the
//! same way. Isolated noise pixels do not. For every edge pixel whose
//! quantized direction agrees with a sufficient share of its edge
//! neighbours, the magnitude is multiplied by a fixed boost before the
//! refiner re-thresholds, so genuine boundaries survive a threshold that
//! suppresses speckle.

use super::grad::Grad;
use crate::image::{ImageF32, ImageViewMut};
use serde::{Deserialize, Serialize};

/// Tuning for the coherence stage.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceOptions {
    /// Minimum magnitude for a pixel to participate as an edge pixel.
    pub mag_thresh: f32,
    /// Fraction of edge neighbours that must agree in direction.
    pub agree_fraction: f32,
    /// Magnitude multiplier applied to coherent pixels.
    pub boost: f32,
}

impl Default for CoherenceOptions {
    fn default() -> Self {
        Self {
            mag_thresh: 0.08,
            agree_fraction: 0.60,
            boost: 1.8,
        }
    }
}

/// Quantized directions `a` and `b` agree when they are within one bin on
/// the 8-bin ring.
#[inline]
fn bins_agree(a: u8, b: u8) -> bool {
    let d = (a as i32 - b as i32).rem_euclid(8);
    d <= 1 || d >= 7
}

/// Produce a boosted copy of the gradient magnitude.
pub fn coherence_boost(grad: &Grad, opts: &CoherenceOptions) -> ImageF32 {
    let w = grad.mag.w;
    let h = grad.mag.h;
    let mut out = grad.mag.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        let out_row = out.row_mut(y);
        for x in 1..w - 1 {
            let mag = grad.mag.get(x, y);
            if mag < opts.mag_thresh {
                continue;
            }
            let center = grad.ori_q8[y * w + x];
            let mut edge_neighbors = 0u32;
            let mut agreeing = 0u32;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = (x as i32 + dx) as usize;
                    let ny = (y as i32 + dy) as usize;
                    if grad.mag.get(nx, ny) < opts.mag_thresh {
                        continue;
                    }
                    edge_neighbors += 1;
                    if bins_agree(center, grad.ori_q8[ny * w + nx]) {
                        agreeing += 1;
                    }
                }
            }
            if edge_neighbors > 0
                && agreeing as f32 / edge_neighbors as f32 >= opts.agree_fraction
            {
                out_row[x] = mag * opts.boost;
            }
        }
    }
    out
}
