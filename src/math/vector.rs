//! 3- and 4-component vectors

use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::EPSILON;
use crate::error::{Error, Result};

/// Componentwise arithmetic shared by every vector type.
///
/// `a * b` and `a / b` are componentwise, `v * s` scales. The `*Assign`
/// forms mutate the receiver with the same numeric semantics.
macro_rules! impl_vector_ops {
    ($ty:ident { $($field:ident),+ }) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, other: $ty) -> $ty {
                $ty { $($field: self.$field + other.$field),+ }
            }
        }

        impl Add<f64> for $ty {
            type Output = $ty;
            fn add(self, s: f64) -> $ty {
                $ty { $($field: self.$field + s),+ }
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, other: $ty) -> $ty {
                $ty { $($field: self.$field - other.$field),+ }
            }
        }

        impl Sub<f64> for $ty {
            type Output = $ty;
            fn sub(self, s: f64) -> $ty {
                $ty { $($field: self.$field - s),+ }
            }
        }

        impl Mul for $ty {
            type Output = $ty;
            fn mul(self, other: $ty) -> $ty {
                $ty { $($field: self.$field * other.$field),+ }
            }
        }

        impl Mul<f64> for $ty {
            type Output = $ty;
            fn mul(self, s: f64) -> $ty {
                $ty { $($field: self.$field * s),+ }
            }
        }

        impl Mul<$ty> for f64 {
            type Output = $ty;
            fn mul(self, v: $ty) -> $ty {
                v * self
            }
        }

        impl Div for $ty {
            type Output = $ty;
            fn div(self, other: $ty) -> $ty {
                $ty { $($field: self.$field / other.$field),+ }
            }
        }

        impl Div<f64> for $ty {
            type Output = $ty;
            fn div(self, s: f64) -> $ty {
                $ty { $($field: self.$field / s),+ }
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty { $($field: -self.$field),+ }
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, other: $ty) {
                $(self.$field += other.$field;)+
            }
        }

        impl AddAssign<f64> for $ty {
            fn add_assign(&mut self, s: f64) {
                $(self.$field += s;)+
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, other: $ty) {
                $(self.$field -= other.$field;)+
            }
        }

        impl SubAssign<f64> for $ty {
            fn sub_assign(&mut self, s: f64) {
                $(self.$field -= s;)+
            }
        }

        impl MulAssign for $ty {
            fn mul_assign(&mut self, other: $ty) {
                $(self.$field *= other.$field;)+
            }
        }

        impl MulAssign<f64> for $ty {
            fn mul_assign(&mut self, s: f64) {
                $(self.$field *= s;)+
            }
        }

        impl DivAssign for $ty {
            fn div_assign(&mut self, other: $ty) {
                $(self.$field /= other.$field;)+
            }
        }

        impl DivAssign<f64> for $ty {
            fn div_assign(&mut self, s: f64) {
                $(self.$field /= s;)+
            }
        }

        /// Tolerance-based: components may differ by at most `EPSILON`.
        impl PartialEq for $ty {
            fn eq(&self, other: &$ty) -> bool {
                self.approx_eq(*other, EPSILON)
            }
        }

        impl $ty {
            pub fn approx_eq(self, other: $ty, epsilon: f64) -> bool {
                true $(&& (self.$field - other.$field).abs() <= epsilon)+
            }

            pub fn dot(self, other: $ty) -> f64 {
                0.0 $(+ self.$field * other.$field)+
            }

            pub fn length_squared(self) -> f64 {
                self.dot(self)
            }

            pub fn length(self) -> f64 {
                self.length_squared().sqrt()
            }

            /// Unit vector in the same direction.
            ///
            /// A zero-length vector has no direction and yields
            /// `Error::ZeroLengthVector` rather than NaN components.
            pub fn normalize(self) -> Result<$ty> {
                let l = self.length();
                if l == 0.0 || !l.is_finite() {
                    return Err(Error::ZeroLengthVector);
                }
                Ok(self / l)
            }

            pub fn normalize_in_place(&mut self) -> Result<&mut Self> {
                *self = self.normalize()?;
                Ok(self)
            }

            pub fn scale(self, s: f64) -> $ty {
                self * s
            }

            pub fn abs(self) -> $ty {
                $ty { $($field: self.$field.abs()),+ }
            }

            pub fn abs_in_place(&mut self) -> &mut Self {
                *self = self.abs();
                self
            }

            /// Clamp every component to `[min, max]`
            pub fn clamp(self, min: f64, max: f64) -> $ty {
                $ty { $($field: self.$field.clamp(min, max)),+ }
            }

            pub fn clamp_in_place(&mut self, min: f64, max: f64) -> &mut Self {
                *self = self.clamp(min, max);
                self
            }

            /// Componentwise clamp between two bounding vectors
            pub fn clamp_vec(self, min: $ty, max: $ty) -> $ty {
                $ty { $($field: self.$field.clamp(min.$field, max.$field)),+ }
            }

            pub fn lerp(self, other: $ty, t: f64) -> $ty {
                self + (other - self) * t
            }
        }
    };
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl_vector_ops!(Vec3 { x, y, z });

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflect `self` (pointing at the surface) about `normal`
    pub fn reflect(self, normal: Vec3) -> Vec3 {
        self - normal * (2.0 * self.dot(normal))
    }

    /// Read the `index`-th item of a flat buffer holding 3-component items
    pub fn from_slice(array: &[f64], index: usize) -> Option<Vec3> {
        let base = index.checked_mul(3)?;
        match array.get(base..base + 3) {
            Some(&[x, y, z]) => Some(Vec3 { x, y, z }),
            _ => None,
        }
    }

    pub fn get(self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => Some(self.z),
            _ => None,
        }
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of range: {}", index),
        }
    }
}

/// 4D (homogeneous) vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl_vector_ops!(Vec4 { x, y, z, w });

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const fn from_vec3(v: Vec3, w: f64) -> Self {
        Self { x: v.x, y: v.y, z: v.z, w }
    }

    /// Homogeneous divide back to 3D
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x / self.w, self.y / self.w, self.z / self.w)
    }

    /// Drop `w` without dividing
    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn get(self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => Some(self.z),
            3 => Some(self.w),
            _ => None,
        }
    }
}

impl Index<usize> for Vec4 {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vec4 index out of range: {}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_vec3_cross() {
        let c = Vec3::new(1.0, 0.0, 0.0).cross(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(c, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_normalize_has_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-1.0, 2.5, 1e-3),
            Vec3::new(1e6, -2e6, 3e6),
        ] {
            let n = v.normalize().unwrap();
            assert!((n.length() - 1.0).abs() < 1e-9);
        }
        let n = Vec4::new(1.0, 1.0, 1.0, 1.0).normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_zero_is_error() {
        assert!(matches!(Vec3::ZERO.normalize(), Err(Error::ZeroLengthVector)));
        assert!(matches!(Vec4::ZERO.normalize(), Err(Error::ZeroLengthVector)));

        let mut v = Vec3::ZERO;
        assert!(v.normalize_in_place().is_err());
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn test_in_place_matches_value_form() {
        let a = Vec3::new(1.0, -2.0, 3.0);
        let b = Vec3::new(0.5, 4.0, -1.0);

        let mut c = a;
        c += b;
        assert_eq!(c, a + b);

        let mut d = a;
        d *= 2.0;
        assert_eq!(d, a * 2.0);

        let mut e = a;
        e.clamp_in_place(-1.0, 1.0).abs_in_place();
        assert_eq!(e, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_equality_is_tolerant() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(a, a + 1e-12);
        assert_ne!(a, a + 1e-6);
    }

    #[test]
    fn test_from_slice() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(Vec3::from_slice(&data, 1), Some(Vec3::new(3.0, 4.0, 5.0)));
        assert_eq!(Vec3::from_slice(&data, 2), None);
    }

    #[test]
    fn test_vec4_homogeneous_divide() {
        let v = Vec4::new(2.0, 4.0, 6.0, 2.0);
        assert_eq!(v.to_vec3(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.xyz(), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(v[3], 2.0);
    }
}
