//! Vertex buffers and built-in shapes
//!
//! Positions and normals are flat `f64` buffers with three components per
//! vertex. With an index buffer every three indices form a triangle;
//! without one every three consecutive vertices do.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::Vec3;
use crate::rasterizer::{Attributes, FrontFace};

/// A flat buffer read `item_size` values at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferAttribute<T> {
    pub array: Vec<T>,
    pub item_size: usize,
}

impl<T> BufferAttribute<T> {
    pub fn new(array: Vec<T>, item_size: usize) -> Self {
        Self { array, item_size }
    }

    /// Number of whole items
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.array.len() / self.item_size
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub positions: BufferAttribute<f64>,
    pub normals: BufferAttribute<f64>,
    #[serde(default)]
    pub indices: Option<BufferAttribute<u32>>,
    /// Screen winding that counts as front-facing
    #[serde(default)]
    pub front_face: FrontFace,
}

impl Geometry {
    pub fn new(positions: BufferAttribute<f64>, normals: BufferAttribute<f64>) -> Self {
        Self {
            positions,
            normals,
            indices: None,
            front_face: FrontFace::default(),
        }
    }

    pub fn with_indices(mut self, indices: BufferAttribute<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_front_face(mut self, front_face: FrontFace) -> Self {
        self.front_face = front_face;
        self
    }

    /// Non-indexed geometry from per-vertex positions and normals
    pub fn from_vertices(positions: &[Vec3], normals: &[Vec3]) -> Self {
        let flatten = |vs: &[Vec3]| vs.iter().flat_map(|v| [v.x, v.y, v.z]).collect();
        Self::new(
            BufferAttribute::new(flatten(positions), 3),
            BufferAttribute::new(flatten(normals), 3),
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.count()
    }

    /// Check every buffer against the layout `triangles()` reads
    pub fn validate(&self) -> Result<()> {
        check_item_size("position", &self.positions, 3)?;
        check_item_size("normal", &self.normals, 3)?;

        let count = self.vertex_count();
        if self.normals.count() != count {
            return Err(Error::InvalidAttributeLayout {
                attribute: "normal",
                expected: count,
                found: self.normals.count(),
            });
        }

        match &self.indices {
            Some(indices) => {
                check_item_size("index", indices, 3)?;
                if let Some(&bad) = indices.array.iter().find(|&&i| i as usize >= count) {
                    return Err(Error::InvalidAttributeLayout {
                        attribute: "index",
                        expected: count,
                        found: bad as usize,
                    });
                }
            }
            None if count % 3 != 0 => {
                return Err(Error::InvalidAttributeLayout {
                    attribute: "position",
                    expected: count - count % 3,
                    found: count,
                });
            }
            None => {}
        }

        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.array.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Position and normal of vertex `i`, if both exist
    pub fn vertex(&self, i: usize) -> Option<Attributes> {
        Some(Attributes {
            local_position: Vec3::from_slice(&self.positions.array, i)?,
            local_normal: Vec3::from_slice(&self.normals.array, i)?,
        })
    }

    /// Every triangle's vertex attributes, in buffer order.
    ///
    /// Triangles referencing missing vertices are skipped; call `validate`
    /// first to turn those into an error instead.
    pub fn triangles(&self) -> impl Iterator<Item = [Attributes; 3]> + '_ {
        (0..self.triangle_count()).filter_map(move |t| {
            let [a, b, c] = match &self.indices {
                Some(indices) => {
                    let i = &indices.array[t * 3..t * 3 + 3];
                    [i[0] as usize, i[1] as usize, i[2] as usize]
                }
                None => [t * 3, t * 3 + 1, t * 3 + 2],
            };
            Some([self.vertex(a)?, self.vertex(b)?, self.vertex(c)?])
        })
    }

    /// Axis-aligned box centred on the origin, faces wound counter-clockwise
    /// seen from outside, with flat per-face normals
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        let half = Vec3::new(width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u, v) with u x v = normal
        let faces = [
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
            (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ];

        let mut positions = Vec::with_capacity(6 * 4 * 3);
        let mut normals = Vec::with_capacity(6 * 4 * 3);
        let mut indices = Vec::with_capacity(6 * 6);

        for (face, (n, u, v)) in faces.iter().enumerate() {
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (*n + *u * su + *v * sv) * half;
                positions.extend_from_slice(&[p.x, p.y, p.z]);
                normals.extend_from_slice(&[n.x, n.y, n.z]);
            }
            let base = face as u32 * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(BufferAttribute::new(positions, 3), BufferAttribute::new(normals, 3))
            .with_indices(BufferAttribute::new(indices, 3))
    }

    /// Rectangle in the XY plane facing +Z
    pub fn plane(width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let positions = vec![
            hw, hh, 0.0, //
            -hw, hh, 0.0, //
            -hw, -hh, 0.0, //
            hw, -hh, 0.0,
        ];
        let normals = [0.0, 0.0, 1.0].repeat(4);
        Self::new(BufferAttribute::new(positions, 3), BufferAttribute::new(normals, 3))
            .with_indices(BufferAttribute::new(vec![0, 1, 3, 3, 1, 2], 3))
    }
}

fn check_item_size<T>(attribute: &'static str, buffer: &BufferAttribute<T>, item_size: usize) -> Result<()> {
    if buffer.item_size != item_size {
        return Err(Error::InvalidAttributeLayout {
            attribute,
            expected: item_size,
            found: buffer.item_size,
        });
    }
    if buffer.array.len() % item_size != 0 {
        return Err(Error::InvalidAttributeLayout {
            attribute,
            expected: buffer.array.len() - buffer.array.len() % item_size,
            found: buffer.array.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_indexed_triangles() {
        let g = Geometry::from_vertices(
            &[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)].repeat(2),
            &[Vec3::new(0.0, 0.0, 1.0); 6],
        );
        assert!(g.validate().is_ok());
        assert_eq!(g.triangle_count(), 2);
        let tris: Vec<_> = g.triangles().collect();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1][1].local_position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_indexed_triangles() {
        let g = Geometry::plane(2.0, 2.0);
        assert!(g.validate().is_ok());
        let tris: Vec<_> = g.triangles().collect();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0][2].local_position, Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(tris[1][2].local_position, Vec3::new(-1.0, -1.0, 0.0));
    }

    #[test]
    fn test_wrong_item_size() {
        let mut g = Geometry::plane(1.0, 1.0);
        g.positions.item_size = 4;
        assert!(matches!(
            g.validate(),
            Err(Error::InvalidAttributeLayout { attribute: "position", expected: 3, found: 4 })
        ));
    }

    #[test]
    fn test_normal_count_mismatch() {
        let mut g = Geometry::plane(1.0, 1.0);
        g.normals.array.truncate(9);
        assert!(matches!(
            g.validate(),
            Err(Error::InvalidAttributeLayout { attribute: "normal", expected: 4, found: 3 })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let g = Geometry::plane(1.0, 1.0).with_indices(BufferAttribute::new(vec![0, 1, 7], 3));
        assert!(matches!(
            g.validate(),
            Err(Error::InvalidAttributeLayout { attribute: "index", found: 7, .. })
        ));
        // Unvalidated iteration skips the broken triangle
        assert_eq!(g.triangles().count(), 0);
    }

    #[test]
    fn test_partial_triangle() {
        let g = Geometry::from_vertices(&[Vec3::ZERO; 4], &[Vec3::UP; 4]);
        assert!(matches!(
            g.validate(),
            Err(Error::InvalidAttributeLayout { attribute: "position", expected: 3, found: 4 })
        ));
    }

    #[test]
    fn test_cuboid_faces_point_outwards() {
        let g = Geometry::cuboid(2.0, 4.0, 6.0);
        assert!(g.validate().is_ok());
        assert_eq!(g.triangle_count(), 12);
        for [a, b, c] in g.triangles() {
            let n = (b.local_position - a.local_position).cross(c.local_position - a.local_position);
            assert!(n.dot(a.local_normal) > 0.0);
            // Each vertex lies on the face its normal names
            let extent = Vec3::new(1.0, 2.0, 3.0);
            assert!((a.local_position.dot(a.local_normal) - extent.dot(a.local_normal.abs())).abs() < 1e-12);
        }
    }
}
