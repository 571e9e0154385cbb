//! Triangle coverage with integer edge functions
//!
//! Screen positions are snapped to fixed point before any coverage test, so
//! two triangles sharing an edge see exactly the same edge function values
//! and the top-left rule hands every pixel on that edge to exactly one of
//! them.

use super::types::{Fragment, FrontFace};

/// Fractional bits kept when snapping screen positions
pub const SUBPIXEL_BITS: u32 = 8;
const SUBPIXEL_ONE: f64 = (1 << SUBPIXEL_BITS) as f64;

pub fn to_fixed(v: f64) -> i64 {
    (v * SUBPIXEL_ONE).round() as i64
}

/// Twice the signed area of (a, b, p); positive when p is clockwise of
/// a->b on a y-down screen
#[inline]
fn edge(a: [i64; 2], b: [i64; 2], p: [i64; 2]) -> i64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Edges whose ties count as inside, for a positive-area triangle: the flat
/// top edge (walked left to right) and left edges (walked upwards)
#[inline]
fn is_top_left(a: [i64; 2], b: [i64; 2]) -> bool {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dy == 0 && dx > 0) || dy < 0
}

/// A snapped, non-degenerate triangle ready for coverage testing
#[derive(Debug, Clone, Copy)]
pub struct TriangleSetup {
    points: [[i64; 2]; 3],
    area: i64,
    winding: FrontFace,
    /// Vertices 1 and 2 were swapped to make the area positive
    swapped: bool,
}

impl TriangleSetup {
    /// `None` when the snapped triangle has zero area
    pub fn new(screen: [[f64; 2]; 3]) -> Option<Self> {
        let mut points = screen.map(|[x, y]| [to_fixed(x), to_fixed(y)]);
        let mut area = edge(points[0], points[1], points[2]);
        if area == 0 {
            return None;
        }

        let winding = if area > 0 {
            FrontFace::Clockwise
        } else {
            FrontFace::CounterClockwise
        };
        let swapped = area < 0;
        if swapped {
            points.swap(1, 2);
            area = -area;
        }

        Some(Self {
            points,
            area,
            winding,
            swapped,
        })
    }

    /// On-screen winding of the vertices as given
    pub fn winding(&self) -> FrontFace {
        self.winding
    }

    /// Pixel rectangle (inclusive) worth testing, clamped to the target
    fn bounds(&self, width: usize, height: usize) -> Option<(i64, i64, i64, i64)> {
        if width == 0 || height == 0 {
            return None;
        }
        let xs = self.points.map(|p| p[0]);
        let ys = self.points.map(|p| p[1]);
        let shift = SUBPIXEL_BITS;
        let min_x = ((xs.iter().min()? + (1 << shift) - 1) >> shift).max(0);
        let min_y = ((ys.iter().min()? + (1 << shift) - 1) >> shift).max(0);
        let max_x = (xs.iter().max()? >> shift).min(width as i64 - 1);
        let max_y = (ys.iter().max()? >> shift).min(height as i64 - 1);
        if min_x > max_x || min_y > max_y {
            None
        } else {
            Some((min_x, min_y, max_x, max_y))
        }
    }

    /// Call `f` for every covered pixel with the screen-space barycentric
    /// weights of the three vertices, in the order they were given.
    ///
    /// Pixels are visited row by row, left to right.
    pub fn for_each_fragment(&self, width: usize, height: usize, mut f: impl FnMut(Fragment, [f64; 3])) {
        let Some((min_x, min_y, max_x, max_y)) = self.bounds(width, height) else {
            return;
        };
        let [p0, p1, p2] = self.points;
        let top_left = [is_top_left(p1, p2), is_top_left(p2, p0), is_top_left(p0, p1)];
        let area = self.area as f64;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x << SUBPIXEL_BITS, y << SUBPIXEL_BITS];
                let w = [edge(p1, p2, p), edge(p2, p0, p), edge(p0, p1, p)];

                let inside = w
                    .iter()
                    .zip(top_left)
                    .all(|(&wi, tl)| wi > 0 || (wi == 0 && tl));
                if !inside {
                    continue;
                }

                let mut weights = [w[0] as f64 / area, w[1] as f64 / area, w[2] as f64 / area];
                if self.swapped {
                    weights.swap(1, 2);
                }
                f(Fragment::new(x as i32, y as i32), weights);
            }
        }
    }
}

/// Pixels covered by a triangle, regardless of winding
pub fn coverage(screen: [[f64; 2]; 3], width: usize, height: usize) -> Vec<Fragment> {
    let mut out = Vec::new();
    if let Some(setup) = TriangleSetup::new(screen) {
        setup.for_each_fragment(width, height, |frag, _| out.push(frag));
    }
    out
}
