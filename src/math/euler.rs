//! Euler angle rotations

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use super::{Mat4, Vec3};

/// Order in which the per-axis rotations are applied (first letter first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

/// Rotation about the local X, Y and Z axes, in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerRotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub order: RotationOrder,
}

impl EulerRotation {
    pub const IDENTITY: EulerRotation = EulerRotation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        order: RotationOrder::Xyz,
    };

    pub const fn new(x: f64, y: f64, z: f64, order: RotationOrder) -> Self {
        Self { x, y, z, order }
    }

    pub fn to_matrix(self) -> Mat4 {
        Mat4::from_rotation(self)
    }

    /// Recover `Xyz` angles from a pure rotation matrix (`R = Rz * Ry * Rx`).
    ///
    /// Near gimbal lock (|cos y| ~ 0) the X angle is folded into Z.
    pub fn from_matrix_xyz(m: &Mat4) -> EulerRotation {
        let r31 = m[(2, 0)].clamp(-1.0, 1.0);
        let y = (-r31).asin();

        if r31.abs() < 1.0 - 1e-9 {
            let x = m[(2, 1)].atan2(m[(2, 2)]);
            let z = m[(1, 0)].atan2(m[(0, 0)]);
            EulerRotation::new(x, y, z, RotationOrder::Xyz)
        } else {
            let z = (-m[(0, 1)]).atan2(m[(1, 1)]);
            EulerRotation::new(0.0, y, z, RotationOrder::Xyz)
        }
    }

    /// Angles as a vector, ignoring the order
    pub fn angles(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Adds angles; the result keeps the left operand's order
impl Add for EulerRotation {
    type Output = EulerRotation;
    fn add(self, other: EulerRotation) -> EulerRotation {
        EulerRotation::new(self.x + other.x, self.y + other.y, self.z + other.z, self.order)
    }
}

impl Sub for EulerRotation {
    type Output = EulerRotation;
    fn sub(self, other: EulerRotation) -> EulerRotation {
        EulerRotation::new(self.x - other.x, self.y - other.y, self.z - other.z, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_left_order() {
        let a = EulerRotation::new(0.1, 0.2, 0.3, RotationOrder::Zyx);
        let b = EulerRotation::new(1.0, 1.0, 1.0, RotationOrder::Xyz);
        let c = a + b;
        assert_eq!(c.order, RotationOrder::Zyx);
        assert!((c.y - 1.2).abs() < 1e-12);
        assert!(((c - b).x - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_round_trip() {
        let r = EulerRotation::new(0.4, -0.7, 1.3, RotationOrder::Xyz);
        let back = EulerRotation::from_matrix_xyz(&r.to_matrix());
        assert!(back.to_matrix().approx_eq(&r.to_matrix(), 1e-9));
        assert!((back.x - 0.4).abs() < 1e-9);
        assert!((back.y + 0.7).abs() < 1e-9);
        assert!((back.z - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_gimbal_lock_still_reproduces_matrix() {
        let r = EulerRotation::new(0.5, std::f64::consts::FRAC_PI_2, 0.2, RotationOrder::Xyz);
        let back = EulerRotation::from_matrix_xyz(&r.to_matrix());
        assert!(back.to_matrix().approx_eq(&r.to_matrix(), 1e-6));
    }
}
