//! Connected components and boundary contours of binary masks.
//!
//! Components are grown with the same seed-stack pattern the segmenters use;
//! boundaries are traced with Moore neighbourhood following in clockwise
//! image order (y down). A traced contour is the ordered sequence of
//! boundary pixel centres of one component.

use super::Mask;

/// Ordered boundary of one connected mask region.
#[derive(Clone, Debug)]
pub struct Contour {
    pub points: Vec<[f32; 2]>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed polygon perimeter.
    pub fn perimeter(&self) -> f32 {
        if self.points.len() < 2 {
            return 0.0;
        }
        let mut sum = 0.0f32;
        for i in 0..self.points.len() {
            let a = self.points[i];
            let b = self.points[(i + 1) % self.points.len()];
            sum += ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
        }
        sum
    }

    /// Mean of the contour points.
    pub fn centroid(&self) -> Option<[f32; 2]> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f32;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p[0], sy + p[1]));
        Some([sx / n, sy / n])
    }

    /// Translate every point by `(dx, dy)`; used to map ROI-space contours
    /// back into frame coordinates.
    pub fn shifted(&self, dx: f32, dy: f32) -> Contour {
        Contour {
            points: self.points.iter().map(|p| [p[0] + dx, p[1] + dy]).collect(),
        }
    }
}

/// One 8-connected foreground region.
#[derive(Clone, Debug)]
pub struct Component {
    /// Region pixels as a mask over the full input extent.
    pub mask: Mask,
    pub area: usize,
    /// Topmost-leftmost pixel, the anchor for boundary tracing.
    pub seed: (usize, usize),
}

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Label all 8-connected components with at least `min_area` pixels.
pub fn connected_components(mask: &Mask, min_area: usize) -> Vec<Component> {
    let (w, h) = (mask.w, mask.h);
    let mut used = vec![0u8; w * h];
    let mut stack: Vec<usize> = Vec::with_capacity(64);
    let mut components = Vec::new();

    for idx in 0..w * h {
        if mask.data[idx] == 0 || used[idx] != 0 {
            continue;
        }
        used[idx] = 1;
        stack.clear();
        stack.push(idx);
        let mut region = Vec::new();
        while let Some(i) = stack.pop() {
            region.push(i);
            let x = i % w;
            let y = i / w;
            for (dx, dy) in NEIGH_OFFSETS {
                let xn = x as isize + dx;
                let yn = y as isize + dy;
                if xn < 0 || yn < 0 || xn >= w as isize || yn >= h as isize {
                    continue;
                }
                let ni = yn as usize * w + xn as usize;
                if mask.data[ni] != 0 && used[ni] == 0 {
                    used[ni] = 1;
                    stack.push(ni);
                }
            }
        }
        if region.len() < min_area {
            continue;
        }
        let mut comp_mask = Mask::new(w, h);
        let mut seed = (w, h);
        for &i in &region {
            comp_mask.data[i] = 1;
            let p = (i % w, i / w);
            // Raster order: smallest y, then smallest x.
            if (p.1, p.0) < (seed.1, seed.0) {
                seed = p;
            }
        }
        components.push(Component {
            mask: comp_mask,
            area: region.len(),
            seed,
        });
    }
    components
}

/// Largest 8-connected component, or `None` for an empty mask.
pub fn largest_component(mask: &Mask) -> Option<Component> {
    connected_components(mask, 1)
        .into_iter()
        .max_by_key(|c| c.area)
}

/// Boundary contour of the largest component, or `None` for an empty mask.
pub fn largest_contour(mask: &Mask) -> Option<Contour> {
    let comp = largest_component(mask)?;
    Some(trace_boundary(&comp.mask, comp.seed))
}

/// Moore-neighbour boundary following, clockwise in image coordinates.
///
/// `start` must be the topmost-leftmost foreground pixel of a single
/// component (its N/NE/NW/W neighbours are then guaranteed background).
pub fn trace_boundary(mask: &Mask, start: (usize, usize)) -> Contour {
    // Clockwise direction ring with y pointing down: E, SE, S, SW, W, NW, N, NE.
    const DIRS: [(isize, isize); 8] = [
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];
    let fg = |x: isize, y: isize| -> bool {
        x >= 0 && y >= 0 && (x as usize) < mask.w && (y as usize) < mask.h
            && mask.get(x as usize, y as usize)
    };

    let mut points = Vec::new();
    let mut cur = (start.0 as isize, start.1 as isize);
    let mut dir = 0usize;
    let max_steps = 4 * mask.w * mask.h + 8;

    for step in 0..max_steps {
        points.push([cur.0 as f32, cur.1 as f32]);
        // After moving in `dir`, resume the clockwise sweep from the
        // neighbour two steps counter-clockwise of the arrival direction.
        let scan_from = if step == 0 { 0 } else { (dir + 6) % 8 };
        let mut next = None;
        for i in 0..8 {
            let d = (scan_from + i) % 8;
            let (dx, dy) = DIRS[d];
            if fg(cur.0 + dx, cur.1 + dy) {
                next = Some((cur.0 + dx, cur.1 + dy, d));
                break;
            }
        }
        match next {
            None => break, // isolated pixel
            Some((nx, ny, d)) => {
                if (nx as usize, ny as usize) == start {
                    break;
                }
                cur = (nx, ny);
                dir = d;
            }
        }
    }
    Contour { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiRect;

    fn block(w: usize, h: usize, r: RoiRect) -> Mask {
        Mask::from_fn(w, h, |x, y| x >= r.x0 && x < r.x1 && y >= r.y0 && y < r.y1)
    }

    #[test]
    fn two_components_found_and_ranked() {
        let mut m = block(30, 20, RoiRect::new(2, 2, 12, 12));
        for y in 14..18 {
            for x in 20..26 {
                m.set(x, y, true);
            }
        }
        let comps = connected_components(&m, 1);
        assert_eq!(comps.len(), 2);
        let largest = largest_component(&m).unwrap();
        assert_eq!(largest.area, 100);
        assert_eq!(largest.seed, (2, 2));
    }

    #[test]
    fn min_area_filters_specks() {
        let mut m = block(20, 20, RoiRect::new(5, 5, 15, 15));
        m.set(0, 0, true);
        let comps = connected_components(&m, 4);
        assert_eq!(comps.len(), 1);
    }

    #[test]
    fn rectangle_boundary_has_expected_point_count() {
        let m = block(30, 30, RoiRect::new(5, 5, 15, 25));
        let contour = largest_contour(&m).unwrap();
        // 10 x 20 rectangle: boundary pixels = 2*(10 + 20) - 4.
        assert_eq!(contour.len(), 56);
        let c = contour.centroid().unwrap();
        assert!((c[0] - 9.5).abs() < 0.6);
        assert!((c[1] - 14.5).abs() < 0.6);
    }

    #[test]
    fn boundary_of_single_pixel() {
        let mut m = Mask::new(5, 5);
        m.set(2, 2, true);
        let contour = trace_boundary(&m, (2, 2));
        assert_eq!(contour.len(), 1);
    }

    #[test]
    fn perimeter_of_square_boundary() {
        let m = block(20, 20, RoiRect::new(5, 5, 15, 15));
        let contour = largest_contour(&m).unwrap();
        // 9 px side length along pixel centres, four sides.
        assert!((contour.perimeter() - 36.0).abs() < 1.0);
    }
}
