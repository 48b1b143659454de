//! Color representations used by the precision refiner.
//!
//! Two complementary spaces are used because neither alone separates both
//! object classes from the background: HSV statistics distinguish a bright,
//! low-saturation ("white-like") object from a dark/saturated one, and
//! CIELAB (D65) supplies a perceptual distance for foreground/background
//! separation on the dark/saturated branch.

use crate::image::FrameRgb8;

/// Hue in degrees [0, 360), saturation and value in [0, 1].
#[derive(Clone, Copy, Debug)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// CIELAB under the D65 illuminant.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// Dominant color class of the object inside a ROI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorClass {
    /// Bright, low-saturation object; color separation from a similar
    /// background is unreliable, edges carry the signal.
    WhiteLike,
    /// Dark or saturated object; perceptual color distance is informative.
    DarkSaturated,
}

pub fn rgb_to_hsv(px: [u8; 3]) -> Hsv {
    let r = px[0] as f32 / 255.0;
    let g = px[1] as f32 / 255.0;
    let b = px[2] as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta < 1e-6 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max < 1e-6 { 0.0 } else { delta / max };
    Hsv { h, s, v: max }
}

// D65 reference white in XYZ.
const D65_XN: f32 = 0.95047;
const D65_YN: f32 = 1.00000;
const D65_ZN: f32 = 1.08883;

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

pub fn rgb_to_lab(px: [u8; 3]) -> Lab {
    let r = srgb_to_linear(px[0] as f32 / 255.0);
    let g = srgb_to_linear(px[1] as f32 / 255.0);
    let b = srgb_to_linear(px[2] as f32 / 255.0);

    let x = 0.4124 * r + 0.3576 * g + 0.1805 * b;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = 0.0193 * r + 0.1192 * g + 0.9505 * b;

    let fx = lab_f(x / D65_XN);
    let fy = lab_f(y / D65_YN);
    let fz = lab_f(z / D65_ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// CIE76 color difference.
pub fn delta_e(a: Lab, b: Lab) -> f32 {
    ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
}

/// Mean HSV saturation/value over the central half of a frame crop.
///
/// The border half is excluded because the ROI margin deliberately includes
/// background around the object.
pub fn interior_hsv_mean(frame: &FrameRgb8) -> (f32, f32) {
    let (w, h) = (frame.width(), frame.height());
    let (x0, x1) = (w / 4, (3 * w / 4).max(w / 4 + 1).min(w));
    let (y0, y1) = (h / 4, (3 * h / 4).max(h / 4 + 1).min(h));
    let mut s_sum = 0.0f64;
    let mut v_sum = 0.0f64;
    let mut n = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            let hsv = rgb_to_hsv(frame.get(x, y));
            s_sum += hsv.s as f64;
            v_sum += hsv.v as f64;
            n += 1;
        }
    }
    if n == 0 {
        (0.0, 0.0)
    } else {
        ((s_sum / n as f64) as f32, (v_sum / n as f64) as f32)
    }
}

/// Classify the dominant object color inside a ROI crop.
pub fn classify_color(frame: &FrameRgb8, max_white_saturation: f32, min_white_value: f32) -> ColorClass {
    let (s, v) = interior_hsv_mean(frame);
    if s <= max_white_saturation && v >= min_white_value {
        ColorClass::WhiteLike
    } else {
        ColorClass::DarkSaturated
    }
}

/// Mean Lab color of the outermost `ring` pixels, taken as the background
/// estimate for a margin-expanded ROI.
pub fn border_mean_lab(frame: &FrameRgb8, ring: usize) -> Lab {
    let (w, h) = (frame.width(), frame.height());
    let ring = ring.max(1).min(w / 2.max(1)).min(h / 2.max(1)).max(1);
    let mut sum = (0.0f64, 0.0f64, 0.0f64);
    let mut n = 0usize;
    for y in 0..h {
        for x in 0..w {
            let on_ring = x < ring || y < ring || x + ring >= w || y + ring >= h;
            if !on_ring {
                continue;
            }
            let lab = rgb_to_lab(frame.get(x, y));
            sum.0 += lab.l as f64;
            sum.1 += lab.a as f64;
            sum.2 += lab.b as f64;
            n += 1;
        }
    }
    if n == 0 {
        Lab::default()
    } else {
        Lab {
            l: (sum.0 / n as f64) as f32,
            a: (sum.1 / n as f64) as f32,
            b: (sum.2 / n as f64) as f32,
        }
    }
}

/// Perceptual foreground mask: pixels whose CIE76 distance from the border
/// background estimate reaches `delta_e_thresh`.
pub fn color_foreground_mask(frame: &FrameRgb8, ring: usize, delta_e_thresh: f32) -> crate::mask::Mask {
    let background = border_mean_lab(frame, ring);
    crate::mask::Mask::from_fn(frame.width(), frame.height(), |x, y| {
        delta_e(rgb_to_lab(frame.get(x, y)), background) >= delta_e_thresh
    })
}
