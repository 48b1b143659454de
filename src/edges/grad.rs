//! Sobel gradients with magnitude and quantized orientation.
//!
//! - Convolves the 3×3 Sobel pair with border clamping.
//! - Outputs per-pixel `gx`, `gy`, `mag = sqrt(gx^2+gy^2)`.
//! - Caches an 8-bin orientation quantization (π-periodic) per pixel for the
//!   coherence stage, which compares edge directions between neighbours.
//!
//! The continuous magnitude is the primary edge signal of the refiner: it
//! carries sub-pixel information a binarized edge detector throws away.
use crate::image::{ImageF32, ImageView, ImageViewMut};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient buffers and orientation quantization.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative
    pub gx: ImageF32,
    /// Vertical derivative
    pub gy: ImageF32,
    /// Euclidean magnitude per pixel
    pub mag: ImageF32,
    /// Per-pixel quantized orientation in 8 bins (π-periodic)
    pub ori_q8: Vec<u8>,
}

#[inline]
fn quantize_orientation(angle: f32) -> u8 {
    let wrapped = (angle + std::f32::consts::PI).rem_euclid(2.0 * std::f32::consts::PI);
    ((wrapped * (4.0 / std::f32::consts::PI)).floor() as i32 & 7) as u8
}

/// Compute Sobel gradients on a single-channel float image.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    let w = l.w;
    let h = l.h;
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);
    let mut ori_q8 = vec![0u8; w * h];

    if w == 0 || h == 0 {
        return Grad {
            gx,
            gy,
            mag,
            ori_q8,
        };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out_gx = gx.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum_x = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                let k = &SOBEL_KERNEL_X[ky];
                sum_x += row[x_idx[0]] * k[0] + row[x_idx[1]] * k[1] + row[x_idx[2]] * k[2];
            }
            out_gx[x] = sum_x;
        }
        let out_gy = gy.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                let k = &SOBEL_KERNEL_Y[ky];
                sum_y += row[x_idx[0]] * k[0] + row[x_idx[1]] * k[1] + row[x_idx[2]] * k[2];
            }
            out_gy[x] = sum_y;
        }
        let gx_row = gx.row(y);
        let gy_row = gy.row(y);
        let out_mag = mag.row_mut(y);
        for x in 0..w {
            let (sx, sy) = (gx_row[x], gy_row[x]);
            out_mag[x] = (sx * sx + sy * sy).sqrt();
            ori_q8[y * w + x] = quantize_orientation(sy.atan2(sx));
        }
    }

    Grad {
        gx,
        gy,
        mag,
        ori_q8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_step_has_horizontal_gradient() {
        let mut img = ImageF32::new(10, 10);
        for y in 0..10 {
            for x in 5..10 {
                img.set(x, y, 1.0);
            }
        }
        let grad = sobel_gradients(&img);
        assert!(grad.mag.get(5, 5) > 1.0);
        assert!(grad.gx.get(5, 5).abs() > grad.gy.get(5, 5).abs());
        // Flat interior carries no response.
        assert!(grad.mag.get(8, 5) < 1e-6);
    }

    #[test]
    fn orientation_bins_are_pi_periodic_consistent() {
        // Opposite gradient polarities fall in antipodal bins 4 apart.
        let up = quantize_orientation(std::f32::consts::FRAC_PI_2);
        let down = quantize_orientation(-std::f32::consts::FRAC_PI_2);
        assert_eq!((up as i32 - down as i32).rem_euclid(8), 4);
    }
}
