//! Camera projections

use serde::{Deserialize, Serialize};

use crate::math::Mat4;

/// How a camera maps view space onto the clip volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Box-shaped view volume, no foreshortening
    Orthographic {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    },
    /// Frustum with vertical field of view `fov_y` (radians)
    Perspective {
        fov_y: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
}

impl Projection {
    /// OpenGL-style projection matrix; the camera looks down -Z
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => Mat4::new(
                2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left),
                0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom),
                0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near),
                0.0, 0.0, 0.0, 1.0,
            ),
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => {
                let f = 1.0 / (fov_y / 2.0).tan();
                Mat4::new(
                    f / aspect, 0.0, 0.0, 0.0,
                    0.0, f, 0.0, 0.0,
                    0.0, 0.0, -(far + near) / (far - near), -2.0 * far * near / (far - near),
                    0.0, 0.0, -1.0, 0.0,
                )
            }
        }
    }
}

/// A projection plus its cached matrix
#[derive(Debug, Clone)]
pub struct Camera {
    projection: Projection,
    matrix: Mat4,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            matrix: projection.matrix(),
        }
    }

    pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
        })
    }

    /// Orthographic box of `width` x `height` centred on the view axis
    pub fn orthographic_symmetric(width: f64, height: f64, near: f64, far: f64) -> Self {
        Self::orthographic(-width / 2.0, width / 2.0, height / 2.0, -height / 2.0, near, far)
    }

    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.matrix = projection.matrix();
    }

    /// Match a new viewport shape. Perspective cameras change their aspect
    /// ratio; orthographic cameras widen or narrow horizontally around
    /// their centre, keeping the vertical extent.
    pub fn set_aspect(&mut self, new_aspect: f64) {
        let projection = match self.projection {
            Projection::Perspective { fov_y, near, far, .. } => Projection::Perspective {
                fov_y,
                aspect: new_aspect,
                near,
                far,
            },
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => {
                let centre = (left + right) / 2.0;
                let half_width = (top - bottom).abs() * new_aspect / 2.0;
                Projection::Orthographic {
                    left: centre - half_width,
                    right: centre + half_width,
                    top,
                    bottom,
                    near,
                    far,
                }
            }
        };
        self.set_projection(projection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec3, Vec4};

    fn project(camera: &Camera, p: Vec3) -> Vec3 {
        (camera.projection_matrix() * Vec4::from_vec3(p, 1.0)).to_vec3()
    }

    #[test]
    fn test_orthographic_maps_box_to_cube() {
        let cam = Camera::orthographic_symmetric(4.0, 2.0, 1.0, 11.0);
        assert_eq!(project(&cam, Vec3::new(-2.0, 1.0, -1.0)), Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(project(&cam, Vec3::new(2.0, -1.0, -11.0)), Vec3::new(1.0, -1.0, 1.0));
    }

    #[test]
    fn test_perspective_near_far_planes() {
        let cam = Camera::perspective(std::f64::consts::FRAC_PI_2, 1.0, 0.5, 10.0);
        assert!((project(&cam, Vec3::new(0.0, 0.0, -0.5)).z + 1.0).abs() < 1e-9);
        assert!((project(&cam, Vec3::new(0.0, 0.0, -10.0)).z - 1.0).abs() < 1e-9);
        // 90 degree fov: the frustum edge at distance d is at height d
        assert!((project(&cam, Vec3::new(0.0, 3.0, -3.0)).y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_aspect_rebuilds_matrix() {
        let mut cam = Camera::perspective(1.0, 1.0, 0.1, 100.0);
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert!((cam.projection_matrix()[(0, 0)] * 2.0 - before[(0, 0)]).abs() < 1e-12);

        let mut ortho = Camera::orthographic_symmetric(2.0, 2.0, 0.1, 10.0);
        ortho.set_aspect(2.0);
        match *ortho.projection() {
            Projection::Orthographic { left, right, .. } => {
                assert!((left + 2.0).abs() < 1e-12 && (right - 2.0).abs() < 1e-12)
            }
            _ => panic!("projection kind changed"),
        }
    }
}
