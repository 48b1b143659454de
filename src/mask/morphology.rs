//! Morphological operators on binary masks.
//!
//! Besides the usual square erosion/dilation, this module provides the
//! directional closing used by the precision refiner: a horizontal-only and
//! a vertical-only structuring element applied in sequence. Closing gaps one
//! axis at a time does not inflate the boundary along the other axis, which
//! keeps measurements honest on near-axis-aligned objects.

use super::Mask;

/// Structuring element shape for the separable operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// `size × size` square.
    Square(usize),
    /// `size × 1` horizontal bar.
    Horizontal(usize),
    /// `1 × size` vertical bar.
    Vertical(usize),
}

impl Kernel {
    fn half_extents(self) -> (usize, usize) {
        match self {
            Kernel::Square(s) => (s / 2, s / 2),
            Kernel::Horizontal(s) => (s / 2, 0),
            Kernel::Vertical(s) => (0, s / 2),
        }
    }
}

/// Dilate: a pixel becomes foreground if any pixel under the kernel is.
pub fn dilate(mask: &Mask, kernel: Kernel) -> Mask {
    let (rx, ry) = kernel.half_extents();
    window_or(mask, rx, ry)
}

/// Erode: a pixel stays foreground only if every pixel under the kernel is.
/// Pixels outside the mask bounds count as foreground (border clamp).
pub fn erode(mask: &Mask, kernel: Kernel) -> Mask {
    let (rx, ry) = kernel.half_extents();
    // Erosion of the foreground is dilation of the background.
    let inverted = invert(mask);
    let grown = window_or(&inverted, rx, ry);
    invert(&grown)
}

/// Erode with `iterations` repeated passes of the same kernel.
pub fn erode_n(mask: &Mask, kernel: Kernel, iterations: usize) -> Mask {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = erode(&out, kernel);
    }
    out
}

/// Morphological closing (dilate then erode) with one kernel.
pub fn close(mask: &Mask, kernel: Kernel) -> Mask {
    erode(&dilate(mask, kernel), kernel)
}

/// Morphological opening (erode then dilate) with one kernel.
pub fn open(mask: &Mask, kernel: Kernel) -> Mask {
    dilate(&erode(mask, kernel), kernel)
}

/// Directional closing: horizontal bar first, then vertical bar.
pub fn close_directional(mask: &Mask, len: usize) -> Mask {
    let horizontal = close(mask, Kernel::Horizontal(len));
    close(&horizontal, Kernel::Vertical(len))
}

/// Fill enclosed background holes: background pixels not reachable from the
/// mask border become foreground.
pub fn fill_holes(mask: &Mask) -> Mask {
    let (w, h) = (mask.w, mask.h);
    if w == 0 || h == 0 {
        return mask.clone();
    }
    // Flood 4-connected background from every border pixel.
    let mut reachable = vec![0u8; w * h];
    let mut stack: Vec<usize> = Vec::new();
    let seed = |idx: usize, stack: &mut Vec<usize>, reachable: &mut Vec<u8>| {
        if mask.data[idx] == 0 && reachable[idx] == 0 {
            reachable[idx] = 1;
            stack.push(idx);
        }
    };
    for x in 0..w {
        seed(x, &mut stack, &mut reachable);
        seed((h - 1) * w + x, &mut stack, &mut reachable);
    }
    for y in 0..h {
        seed(y * w, &mut stack, &mut reachable);
        seed(y * w + w - 1, &mut stack, &mut reachable);
    }
    while let Some(idx) = stack.pop() {
        let x = idx % w;
        let y = idx / w;
        if x > 0 {
            seed(idx - 1, &mut stack, &mut reachable);
        }
        if x + 1 < w {
            seed(idx + 1, &mut stack, &mut reachable);
        }
        if y > 0 {
            seed(idx - w, &mut stack, &mut reachable);
        }
        if y + 1 < h {
            seed(idx + w, &mut stack, &mut reachable);
        }
    }
    let mut out = mask.clone();
    for (o, &r) in out.data.iter_mut().zip(reachable.iter()) {
        if *o == 0 && r == 0 {
            *o = 1;
        }
    }
    out
}

fn invert(mask: &Mask) -> Mask {
    let mut out = mask.clone();
    for v in out.data.iter_mut() {
        *v = (*v == 0) as u8;
    }
    out
}

/// Separable window-OR over `[-rx, rx] × [-ry, ry]` with border clamp.
fn window_or(mask: &Mask, rx: usize, ry: usize) -> Mask {
    let (w, h) = (mask.w, mask.h);
    let mut horiz = Mask::new(w, h);
    for y in 0..h {
        let row = &mask.data[y * w..(y + 1) * w];
        let out = &mut horiz.data[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(rx);
            let hi = (x + rx + 1).min(w);
            out[x] = row[lo..hi].iter().any(|&v| v != 0) as u8;
        }
    }
    if ry == 0 {
        return horiz;
    }
    let mut out = Mask::new(w, h);
    for y in 0..h {
        let lo = y.saturating_sub(ry);
        let hi = (y + ry + 1).min(h);
        for x in 0..w {
            let mut hit = false;
            for yy in lo..hi {
                if horiz.data[yy * w + x] != 0 {
                    hit = true;
                    break;
                }
            }
            out.data[y * w + x] = hit as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiRect;

    fn block(w: usize, h: usize, r: RoiRect) -> Mask {
        Mask::from_fn(w, h, |x, y| x >= r.x0 && x < r.x1 && y >= r.y0 && y < r.y1)
    }

    #[test]
    fn erode_shrinks_block_by_one() {
        let m = block(20, 20, RoiRect::new(5, 5, 15, 15));
        let e = erode(&m, Kernel::Square(3));
        assert_eq!(e.bounding_box().unwrap(), RoiRect::new(6, 6, 14, 14));
    }

    #[test]
    fn directional_close_bridges_horizontal_gap_only() {
        // Two blocks separated by a 3 px horizontal gap.
        let mut m = block(30, 20, RoiRect::new(2, 5, 12, 15));
        for y in 5..15 {
            for x in 15..25 {
                m.set(x, y, true);
            }
        }
        let closed = close_directional(&m, 9);
        // Gap bridged.
        assert!(closed.get(13, 10));
        // Vertical extent unchanged: no inflation above or below the blocks.
        assert_eq!(closed.bounding_box().unwrap().y0, 5);
        assert_eq!(closed.bounding_box().unwrap().y1, 15);
    }

    #[test]
    fn fill_holes_closes_interior() {
        let mut m = block(20, 20, RoiRect::new(4, 4, 16, 16));
        m.set(10, 10, false);
        m.set(10, 11, false);
        let filled = fill_holes(&m);
        assert!(filled.get(10, 10));
        assert!(filled.get(10, 11));
        // Exterior stays background.
        assert!(!filled.get(0, 0));
    }

    #[test]
    fn open_removes_isolated_noise() {
        let mut m = block(20, 20, RoiRect::new(5, 5, 15, 15));
        m.set(1, 1, true);
        let opened = open(&m, Kernel::Square(3));
        assert!(!opened.get(1, 1));
        assert!(opened.get(10, 10));
    }
}
