//! Clip-space polygon clipping
//!
//! Triangles are clipped against the six planes of the canonical view
//! volume (`-w <= x, y, z <= w`) with Sutherland-Hodgman, one plane at a
//! time. The result is a convex polygon of up to `MAX_POLY_VERTS` vertices
//! that the caller fans back into triangles.

use super::types::Varyings;
use crate::math::Vec4;

/// A triangle gains at most one vertex per clipping plane
pub const MAX_POLY_VERTS: usize = 3 + 6;

/// Vertex after the vertex stage, before perspective division
#[derive(Debug, Clone, Copy)]
pub struct ClipVertex {
    pub position: Vec4,
    pub varyings: Varyings,
    /// The edge from this vertex to the next lies on an edge of the source
    /// triangle, not along a clipping plane
    pub source_edge: bool,
}

impl ClipVertex {
    pub fn new(position: Vec4, varyings: Varyings) -> Self {
        Self {
            position,
            varyings,
            source_edge: true,
        }
    }

    fn lerp(self, other: ClipVertex, t: f64) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(other.position, t),
            varyings: self.varyings.lerp(other.varyings, t),
            source_edge: self.source_edge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plane {
    Near,
    Far,
    Left,
    Right,
    Bottom,
    Top,
}

const PLANES: [Plane; 6] = [
    Plane::Near,
    Plane::Far,
    Plane::Left,
    Plane::Right,
    Plane::Bottom,
    Plane::Top,
];

impl Plane {
    /// Signed distance; inside when >= 0
    fn distance(self, p: Vec4) -> f64 {
        match self {
            Plane::Near => p.z + p.w,
            Plane::Far => p.w - p.z,
            Plane::Left => p.x + p.w,
            Plane::Right => p.w - p.x,
            Plane::Bottom => p.y + p.w,
            Plane::Top => p.w - p.y,
        }
    }
}

/// Point where edge (a, b) crosses the plane.
///
/// Always interpolated from the inside endpoint towards the outside one, so
/// an edge shared by two triangles yields bit-identical points no matter
/// which direction each triangle walks it.
fn intersect(plane: Plane, a: ClipVertex, b: ClipVertex) -> ClipVertex {
    let (inside, outside) = if plane.distance(a.position) >= 0.0 {
        (a, b)
    } else {
        (b, a)
    };
    let di = plane.distance(inside.position);
    let dout = plane.distance(outside.position);
    let t = di / (di - dout);
    inside.lerp(outside, t)
}

fn clip_against(plane: Plane, input: &[ClipVertex], output: &mut Vec<ClipVertex>) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_inside = plane.distance(prev.position) >= 0.0;

    for &curr in input {
        let curr_inside = plane.distance(curr.position) >= 0.0;
        match (prev_inside, curr_inside) {
            (true, true) => output.push(curr),
            // Leaving: the next edge runs along the plane
            (true, false) => output.push(ClipVertex {
                source_edge: false,
                ..intersect(plane, prev, curr)
            }),
            // Entering: the rest of this edge is still the source edge
            (false, true) => {
                output.push(ClipVertex {
                    source_edge: prev.source_edge,
                    ..intersect(plane, prev, curr)
                });
                output.push(curr);
            }
            (false, false) => {}
        }
        prev = curr;
        prev_inside = curr_inside;
    }
}

/// Clip a triangle to the view volume.
///
/// Returns the visible part as a convex polygon in the input winding: empty
/// when nothing is visible, the input itself when nothing is cut.
pub fn clip_triangle(tri: [ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut outside_any = false;
    for plane in PLANES {
        let outside = tri
            .iter()
            .filter(|v| plane.distance(v.position) < 0.0)
            .count();
        if outside == 3 {
            return Vec::new();
        }
        outside_any |= outside > 0;
    }
    if !outside_any {
        return tri.to_vec();
    }

    let mut polygon = Vec::with_capacity(MAX_POLY_VERTS);
    let mut scratch = Vec::with_capacity(MAX_POLY_VERTS);
    polygon.extend_from_slice(&tri);

    for plane in PLANES {
        clip_against(plane, &polygon, &mut scratch);
        std::mem::swap(&mut polygon, &mut scratch);
        if polygon.len() < 3 {
            return Vec::new();
        }
    }

    polygon
}

/// Fan a convex polygon into triangles sharing its first vertex
pub fn fan<T: Copy>(polygon: &[T]) -> impl Iterator<Item = [T; 3]> + '_ {
    (1..polygon.len().saturating_sub(1)).map(move |i| [polygon[0], polygon[i], polygon[i + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn vertex(x: f64, y: f64, z: f64, w: f64) -> ClipVertex {
        ClipVertex::new(Vec4::new(x, y, z, w), Varyings::default())
    }

    fn inside_volume(v: &ClipVertex) -> bool {
        PLANES.iter().all(|p| p.distance(v.position) >= -1e-9)
    }

    #[test]
    fn test_fully_inside_is_unchanged() {
        let tri = [
            vertex(-0.5, -0.5, 0.0, 1.0),
            vertex(0.5, -0.5, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 1.0),
        ];
        let out = clip_triangle(tri);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].position, tri[1].position);
    }

    #[test]
    fn test_fully_behind_near_is_dropped() {
        let tri = [
            vertex(0.0, 0.0, -2.0, 1.0),
            vertex(0.5, 0.0, -3.0, 1.0),
            vertex(0.0, 0.5, -2.5, 1.0),
        ];
        assert!(clip_triangle(tri).is_empty());
        assert_eq!(fan::<ClipVertex>(&[]).count(), 0);
    }

    #[test]
    fn test_straddling_near_plane() {
        // One vertex in front of the near plane, two behind
        let tri = [
            vertex(0.0, 0.0, 0.0, 1.0),
            vertex(0.5, 0.0, -3.0, 1.0),
            vertex(0.0, 0.5, -3.0, 1.0),
        ];
        let out = clip_triangle(tri);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(inside_volume));
        assert!(out.iter().any(|v| (v.position.z + v.position.w).abs() < 1e-12));
    }

    #[test]
    fn test_cut_edges_are_marked() {
        // Two vertices in front of the near plane, one behind: a quad whose
        // one edge along the near plane is not a triangle edge
        let tri = [
            vertex(-0.5, 0.0, 0.0, 1.0),
            vertex(0.5, 0.0, 0.0, 1.0),
            vertex(0.0, 0.5, -3.0, 1.0),
        ];
        let out = clip_triangle(tri);
        assert_eq!(out.len(), 4);
        let cuts: Vec<usize> = (0..out.len()).filter(|&i| !out[i].source_edge).collect();
        assert_eq!(cuts.len(), 1);
        let (a, b) = (out[cuts[0]], out[(cuts[0] + 1) % out.len()]);
        assert!((a.position.z + a.position.w).abs() < 1e-12);
        assert!((b.position.z + b.position.w).abs() < 1e-12);

        let inside = [
            vertex(-0.5, -0.5, 0.0, 1.0),
            vertex(0.5, -0.5, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 1.0),
        ];
        assert!(clip_triangle(inside).iter().all(|v| v.source_edge));
    }

    #[test]
    fn test_corner_cut_produces_fan() {
        // Large triangle poking out through two side planes
        let tri = [
            vertex(-0.5, -0.5, 0.0, 1.0),
            vertex(3.0, -0.5, 0.0, 1.0),
            vertex(-0.5, 3.0, 0.0, 1.0),
        ];
        let out = clip_triangle(tri);
        assert!(out.len() > 3 && out.len() <= MAX_POLY_VERTS);
        assert!(out.iter().all(inside_volume));
        assert_eq!(fan(&out).count(), out.len() - 2);
    }

    #[test]
    fn test_varyings_are_interpolated() {
        let mut a = vertex(0.0, 0.0, 0.0, 1.0);
        let mut b = vertex(0.0, 0.0, -3.0, 1.0);
        let c = vertex(0.5, 0.0, 0.0, 1.0);
        a.varyings.local_position = Vec3::new(0.0, 0.0, 0.0);
        b.varyings.local_position = Vec3::new(0.0, 0.0, 3.0);
        let out = clip_triangle([a, b, c]);
        // Cut at z = -1, one third of the way from a to b
        let cut = out
            .iter()
            .find(|v| (v.position.z + 1.0).abs() < 1e-12 && v.position.x.abs() < 1e-12)
            .unwrap();
        assert!((cut.varyings.local_position.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shared_edge_is_canonical() {
        let a = vertex(0.3, 0.1, 0.2, 1.0);
        let b = vertex(2.7, -0.4, 0.1, 1.0);
        let p = intersect(Plane::Right, a, b);
        let q = intersect(Plane::Right, b, a);
        assert_eq!(p.position.x.to_bits(), q.position.x.to_bits());
        assert_eq!(p.position.y.to_bits(), q.position.y.to_bits());
    }
}
