//! Synthetic frames and masks for end-to-end tests.

use qc_measure::{FrameRgb8, Mask};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mask of a rectangle of `len × wid` centred in `w × h`, rotated by
/// `angle_deg` (counter-clockwise in image coordinates).
pub fn rotated_rect_mask(w: usize, h: usize, len: f32, wid: f32, angle_deg: f32) -> Mask {
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Mask::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;
        u.abs() <= len / 2.0 && v.abs() <= wid / 2.0
    })
}

/// RGB frame rendering `mask` in `obj` color over a `bg` background.
pub fn frame_from_mask(mask: &Mask, obj: [u8; 3], bg: [u8; 3]) -> FrameRgb8 {
    let mut frame = FrameRgb8::new(mask.w, mask.h);
    for y in 0..mask.h {
        for x in 0..mask.w {
            frame.set(x, y, if mask.get(x, y) { obj } else { bg });
        }
    }
    frame
}

/// Add deterministic uniform per-channel noise of `±amplitude` levels.
pub fn with_noise(frame: &FrameRgb8, amplitude: i16, seed: u64) -> FrameRgb8 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = FrameRgb8::new(frame.width(), frame.height());
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let px = frame.get(x, y);
            let mut noisy = [0u8; 3];
            for c in 0..3 {
                let v = px[c] as i16 + rng.gen_range(-amplitude..=amplitude);
                noisy[c] = v.clamp(0, 255) as u8;
            }
            out.set(x, y, noisy);
        }
    }
    out
}

/// Grow a mask by `margin` pixels on each side, imitating the soft halo of
/// a learned segmentation.
pub fn grown_mask(mask: &Mask, margin: i32) -> Mask {
    Mask::from_fn(mask.w, mask.h, |x, y| {
        for dy in -margin..=margin {
            for dx in -margin..=margin {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx >= 0
                    && ny >= 0
                    && (nx as usize) < mask.w
                    && (ny as usize) < mask.h
                    && mask.get(nx as usize, ny as usize)
                {
                    return true;
                }
            }
        }
        false
    })
}
