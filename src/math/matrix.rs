//! 3x3 and 4x4 matrices, row-major, for column-vector transforms (`v' = M v`)

use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{EulerRotation, RotationOrder, Vec3, Vec4, EPSILON, SINGULAR_EPSILON};
use crate::error::{Error, Result};

/// Elementwise arithmetic and the shared accessors of both matrix types
macro_rules! impl_matrix_common {
    ($ty:ident, $n:expr) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, other: $ty) -> $ty {
                let mut elements = self.elements;
                for (e, o) in elements.iter_mut().zip(other.elements.iter()) {
                    *e += o;
                }
                $ty { elements }
            }
        }

        impl Add<f64> for $ty {
            type Output = $ty;
            fn add(self, s: f64) -> $ty {
                $ty { elements: self.elements.map(|e| e + s) }
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, other: $ty) -> $ty {
                let mut elements = self.elements;
                for (e, o) in elements.iter_mut().zip(other.elements.iter()) {
                    *e -= o;
                }
                $ty { elements }
            }
        }

        impl Sub<f64> for $ty {
            type Output = $ty;
            fn sub(self, s: f64) -> $ty {
                $ty { elements: self.elements.map(|e| e - s) }
            }
        }

        impl Mul<f64> for $ty {
            type Output = $ty;
            fn mul(self, s: f64) -> $ty {
                $ty { elements: self.elements.map(|e| e * s) }
            }
        }

        impl Mul<$ty> for f64 {
            type Output = $ty;
            fn mul(self, m: $ty) -> $ty {
                m * self
            }
        }

        impl Div<f64> for $ty {
            type Output = $ty;
            fn div(self, s: f64) -> $ty {
                $ty { elements: self.elements.map(|e| e / s) }
            }
        }

        impl Mul for $ty {
            type Output = $ty;
            fn mul(self, other: $ty) -> $ty {
                let mut elements = [0.0; $n * $n];
                for row in 0..$n {
                    for col in 0..$n {
                        let mut sum = 0.0;
                        for k in 0..$n {
                            sum += self.elements[row * $n + k] * other.elements[k * $n + col];
                        }
                        elements[row * $n + col] = sum;
                    }
                }
                $ty { elements }
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, other: $ty) {
                *self = *self + other;
            }
        }

        impl AddAssign<f64> for $ty {
            fn add_assign(&mut self, s: f64) {
                *self = *self + s;
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, other: $ty) {
                *self = *self - other;
            }
        }

        impl SubAssign<f64> for $ty {
            fn sub_assign(&mut self, s: f64) {
                *self = *self - s;
            }
        }

        impl MulAssign for $ty {
            fn mul_assign(&mut self, other: $ty) {
                *self = *self * other;
            }
        }

        impl MulAssign<f64> for $ty {
            fn mul_assign(&mut self, s: f64) {
                *self = *self * s;
            }
        }

        impl DivAssign<f64> for $ty {
            fn div_assign(&mut self, s: f64) {
                *self = *self / s;
            }
        }

        /// Tolerance-based, like the vector types
        impl PartialEq for $ty {
            fn eq(&self, other: &$ty) -> bool {
                self.approx_eq(other, EPSILON)
            }
        }

        /// `m[(row, col)]`, panics outside the matrix like slice indexing
        impl Index<(usize, usize)> for $ty {
            type Output = f64;
            fn index(&self, (row, col): (usize, usize)) -> &f64 {
                assert!(row < $n && col < $n, "matrix index ({}, {}) out of range", row, col);
                &self.elements[row * $n + col]
            }
        }

        impl $ty {
            pub fn approx_eq(&self, other: &$ty, epsilon: f64) -> bool {
                self.elements
                    .iter()
                    .zip(other.elements.iter())
                    .all(|(a, b)| (a - b).abs() <= epsilon)
            }

            /// Bounds-checked element read
            pub fn get(&self, row: usize, col: usize) -> Option<f64> {
                if row < $n && col < $n {
                    Some(self.elements[row * $n + col])
                } else {
                    None
                }
            }

            /// Bounds-checked element write, returns `None` when out of range
            pub fn set(&mut self, row: usize, col: usize, value: f64) -> Option<&mut Self> {
                if row < $n && col < $n {
                    self.elements[row * $n + col] = value;
                    Some(self)
                } else {
                    None
                }
            }

            pub fn transpose(&self) -> $ty {
                let mut elements = [0.0; $n * $n];
                for row in 0..$n {
                    for col in 0..$n {
                        elements[col * $n + row] = self.elements[row * $n + col];
                    }
                }
                $ty { elements }
            }
        }
    };
}

/// 3x3 matrix (normal matrices, rotation blocks)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mat3 {
    pub elements: [f64; 9],
}

impl_matrix_common!(Mat3, 3);

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };
    pub const ZERO: Mat3 = Mat3 { elements: [0.0; 9] };

    /// Elements in row-major order
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        n11: f64, n12: f64, n13: f64,
        n21: f64, n22: f64, n23: f64,
        n31: f64, n32: f64, n33: f64,
    ) -> Self {
        Self { elements: [n11, n12, n13, n21, n22, n23, n31, n32, n33] }
    }

    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, e, f, g, h, i] = self.elements;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Adjugate over determinant
    pub fn inverse(&self) -> Result<Mat3> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON || !det.is_finite() {
            return Err(Error::SingularMatrix);
        }

        let [a, b, c, d, e, f, g, h, i] = self.elements;
        let adjugate = Mat3::new(
            e * i - f * h, c * h - b * i, b * f - c * e,
            f * g - d * i, a * i - c * g, c * d - a * f,
            d * h - e * g, b * g - a * h, a * e - b * d,
        );
        Ok(adjugate / det)
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        let m = &self.elements;
        Vec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[3] * v.x + m[4] * v.y + m[5] * v.z,
            m[6] * v.x + m[7] * v.y + m[8] * v.z,
        )
    }
}

/// 4x4 matrix (affine and projective transforms)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mat4 {
    pub elements: [f64; 16],
}

impl_matrix_common!(Mat4, 4);

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };
    pub const ZERO: Mat4 = Mat4 { elements: [0.0; 16] };

    /// Elements in row-major order
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        n11: f64, n12: f64, n13: f64, n14: f64,
        n21: f64, n22: f64, n23: f64, n24: f64,
        n31: f64, n32: f64, n33: f64, n34: f64,
        n41: f64, n42: f64, n43: f64, n44: f64,
    ) -> Self {
        Self {
            elements: [
                n11, n12, n13, n14,
                n21, n22, n23, n24,
                n31, n32, n33, n34,
                n41, n42, n43, n44,
            ],
        }
    }

    pub fn from_translation(t: Vec3) -> Mat4 {
        Mat4::new(
            1.0, 0.0, 0.0, t.x,
            0.0, 1.0, 0.0, t.y,
            0.0, 0.0, 1.0, t.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn from_scale(s: Vec3) -> Mat4 {
        Mat4::new(
            s.x, 0.0, 0.0, 0.0,
            0.0, s.y, 0.0, 0.0,
            0.0, 0.0, s.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_x(angle: f64) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_y(angle: f64) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_z(angle: f64) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation matrix for an Euler rotation.
    ///
    /// The axis named first in the order is applied first, so `Xyz`
    /// yields `Rz * Ry * Rx`.
    pub fn from_rotation(rotation: EulerRotation) -> Mat4 {
        let rx = Mat4::rotation_x(rotation.x);
        let ry = Mat4::rotation_y(rotation.y);
        let rz = Mat4::rotation_z(rotation.z);

        let (first, second, third) = match rotation.order {
            RotationOrder::Xyz => (rx, ry, rz),
            RotationOrder::Xzy => (rx, rz, ry),
            RotationOrder::Yxz => (ry, rx, rz),
            RotationOrder::Yzx => (ry, rz, rx),
            RotationOrder::Zxy => (rz, rx, ry),
            RotationOrder::Zyx => (rz, ry, rx),
        };

        third * second * first
    }

    /// Upper-left 3x3 block (rotation and scale, no translation)
    pub fn top_left_3x3(&self) -> Mat3 {
        let m = &self.elements;
        Mat3::new(m[0], m[1], m[2], m[4], m[5], m[6], m[8], m[9], m[10])
    }

    /// Transform a point (w = 1), dropping the homogeneous coordinate
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(p, 1.0)).to_vec3()
    }

    /// Laplace expansion along the first row
    pub fn determinant(&self) -> f64 {
        let m = &self.elements;
        let minor = |c0: usize, c1: usize, c2: usize| {
            m[4 + c0] * (m[8 + c1] * m[12 + c2] - m[8 + c2] * m[12 + c1])
                - m[4 + c1] * (m[8 + c0] * m[12 + c2] - m[8 + c2] * m[12 + c0])
                + m[4 + c2] * (m[8 + c0] * m[12 + c1] - m[8 + c1] * m[12 + c0])
        };
        m[0] * minor(1, 2, 3) - m[1] * minor(0, 2, 3) + m[2] * minor(0, 1, 3)
            - m[3] * minor(0, 1, 2)
    }

    /// Closed-form inverse from 2x2 sub-determinants
    pub fn inverse(&self) -> Result<Mat4> {
        let m = &self.elements;

        let s0 = m[0] * m[5] - m[4] * m[1];
        let s1 = m[0] * m[6] - m[4] * m[2];
        let s2 = m[0] * m[7] - m[4] * m[3];
        let s3 = m[1] * m[6] - m[5] * m[2];
        let s4 = m[1] * m[7] - m[5] * m[3];
        let s5 = m[2] * m[7] - m[6] * m[3];

        let c5 = m[10] * m[15] - m[14] * m[11];
        let c4 = m[9] * m[15] - m[13] * m[11];
        let c3 = m[9] * m[14] - m[13] * m[10];
        let c2 = m[8] * m[15] - m[12] * m[11];
        let c1 = m[8] * m[14] - m[12] * m[10];
        let c0 = m[8] * m[13] - m[12] * m[9];

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < SINGULAR_EPSILON || !det.is_finite() {
            return Err(Error::SingularMatrix);
        }
        let inv = 1.0 / det;

        Ok(Mat4::new(
            (m[5] * c5 - m[6] * c4 + m[7] * c3) * inv,
            (-m[1] * c5 + m[2] * c4 - m[3] * c3) * inv,
            (m[13] * s5 - m[14] * s4 + m[15] * s3) * inv,
            (-m[9] * s5 + m[10] * s4 - m[11] * s3) * inv,
            (-m[4] * c5 + m[6] * c2 - m[7] * c1) * inv,
            (m[0] * c5 - m[2] * c2 + m[3] * c1) * inv,
            (-m[12] * s5 + m[14] * s2 - m[15] * s1) * inv,
            (m[8] * s5 - m[10] * s2 + m[11] * s1) * inv,
            (m[4] * c4 - m[5] * c2 + m[7] * c0) * inv,
            (-m[0] * c4 + m[1] * c2 - m[3] * c0) * inv,
            (m[12] * s4 - m[13] * s2 + m[15] * s0) * inv,
            (-m[8] * s4 + m[9] * s2 - m[11] * s0) * inv,
            (-m[4] * c3 + m[5] * c1 - m[6] * c0) * inv,
            (m[0] * c3 - m[1] * c1 + m[2] * c0) * inv,
            (-m[12] * s3 + m[13] * s1 - m[14] * s0) * inv,
            (m[8] * s3 - m[9] * s1 + m[10] * s0) * inv,
        ))
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        let m = &self.elements;
        Vec4::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z + m[3] * v.w,
            m[4] * v.x + m[5] * v.y + m[6] * v.z + m[7] * v.w,
            m[8] * v.x + m[9] * v.y + m[10] * v.z + m[11] * v.w,
            m[12] * v.x + m[13] * v.y + m[14] * v.z + m[15] * v.w,
        )
    }
}
