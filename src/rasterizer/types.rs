//! Core types for the rasterizer

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use crate::math::{Mat3, Mat4, Vec3};

/// Linear RGB color, nominally 0.0-1.0 per channel
///
/// Lighting sums may exceed 1.0; channels are clamped when stored in a
/// quantized buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0 };

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// From 8-bit channels (0-255)
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Channels of a vector, e.g. a normal for debug views
    pub fn from_vec3(v: Vec3) -> Self {
        Self { r: v.x, g: v.y, b: v.z }
    }

    pub fn clamp(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Rec. 709 relative luminance
    pub fn luminance(self) -> f64 {
        self.r * 0.2126 + self.g * 0.7152 + self.b * 0.0722
    }

    /// Quantize to 8 bits per channel
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamp();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    /// Convert to [u8; 4] (opaque RGBA) for display surfaces
    pub fn to_bytes(self) -> [u8; 4] {
        let [r, g, b] = self.to_rgb8();
        [r, g, b, 255]
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, other: Color) -> Color {
        Color::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

impl Mul<f64> for Color {
    type Output = Color;
    fn mul(self, s: f64) -> Color {
        Color::new(self.r * s, self.g * s, self.b * s)
    }
}

/// Componentwise (filter one color through another)
impl Mul for Color {
    type Output = Color;
    fn mul(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

/// A pixel position covered by a primitive
///
/// Ordering is row-major: by `y`, then by `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fragment {
    // Field order matters for the derived Ord
    pub y: i32,
    pub x: i32,
}

impl Fragment {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Which faces are discarded before filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// Draw both sides
    None,
    Front,
    #[default]
    Back,
}

/// Winding that marks a triangle as front-facing, as seen on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrontFace {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl CullMode {
    /// Whether a triangle with the given on-screen winding is dropped
    pub fn culls(self, winding: FrontFace, front_face: FrontFace) -> bool {
        let is_front = winding == front_face;
        match self {
            CullMode::None => false,
            CullMode::Front => is_front,
            CullMode::Back => !is_front,
        }
    }
}

/// Depth comparison between an incoming fragment and the stored depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthFunc {
    /// Strictly nearer passes; the first writer wins on ties
    Less,
    /// Nearer or equal passes; the last writer wins on ties
    #[default]
    LessEqual,
}

impl DepthFunc {
    pub fn passes(self, incoming: f64, stored: f64) -> bool {
        match self {
            DepthFunc::Less => incoming < stored,
            DepthFunc::LessEqual => incoming <= stored,
        }
    }
}

/// Per-vertex input to the vertex stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attributes {
    pub local_position: Vec3,
    pub local_normal: Vec3,
}

/// Per-fragment values interpolated across a triangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Varyings {
    pub local_position: Vec3,
    pub local_normal: Vec3,
}

impl Varyings {
    pub fn lerp(self, other: Varyings, t: f64) -> Varyings {
        Varyings {
            local_position: self.local_position.lerp(other.local_position, t),
            local_normal: self.local_normal.lerp(other.local_normal, t),
        }
    }

    /// Weighted sum of three vertices' varyings (weights sum to 1)
    pub fn blend(v: &[Varyings; 3], w: [f64; 3]) -> Varyings {
        Varyings {
            local_position: v[0].local_position * w[0]
                + v[1].local_position * w[1]
                + v[2].local_position * w[2],
            local_normal: v[0].local_normal * w[0]
                + v[1].local_normal * w[1]
                + v[2].local_normal * w[2],
        }
    }
}

impl From<Attributes> for Varyings {
    fn from(a: Attributes) -> Self {
        Varyings {
            local_position: a.local_position,
            local_normal: a.local_normal,
        }
    }
}

/// Constants for one draw call (one mesh seen by one camera)
#[derive(Debug, Clone, Copy)]
pub struct Uniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub model_view: Mat4,
    pub projection: Mat4,
    /// Inverse-transpose of the model matrix's 3x3 block
    pub normal_matrix: Mat3,
    /// Camera position in world space
    pub camera_position: Vec3,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Divide barycentric weights by clip-space w before interpolating
    /// varyings (false = affine, PS1-style warping)
    pub perspective_correct: bool,
    /// Draw every mesh as outlines regardless of its material
    pub wireframe: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            perspective_correct: true,
            wireframe: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_order_is_row_major() {
        let mut frags = vec![Fragment::new(3, 1), Fragment::new(0, 2), Fragment::new(1, 1)];
        frags.sort();
        assert_eq!(frags, vec![Fragment::new(1, 1), Fragment::new(3, 1), Fragment::new(0, 2)]);
    }

    #[test]
    fn test_cull_matrix() {
        use FrontFace::*;
        assert!(!CullMode::None.culls(Clockwise, CounterClockwise));
        assert!(CullMode::Back.culls(Clockwise, CounterClockwise));
        assert!(!CullMode::Back.culls(CounterClockwise, CounterClockwise));
        assert!(CullMode::Front.culls(Clockwise, Clockwise));
        assert!(!CullMode::Front.culls(CounterClockwise, Clockwise));
    }

    #[test]
    fn test_depth_funcs_on_ties() {
        assert!(DepthFunc::LessEqual.passes(0.5, 0.5));
        assert!(!DepthFunc::Less.passes(0.5, 0.5));
        assert!(DepthFunc::Less.passes(0.2, 0.8));
        assert!(!DepthFunc::LessEqual.passes(0.8, 0.2));
    }

    #[test]
    fn test_color_quantize_clamps() {
        assert_eq!(Color::new(1.5, -0.2, 0.5).to_rgb8(), [255, 0, 128]);
        assert_eq!(Color::from_rgb8(255, 0, 0), Color::RED);
    }

    #[test]
    fn test_luminance_weights() {
        assert!((Color::WHITE.luminance() - 1.0).abs() < 1e-12);
        assert_eq!(Color::BLACK.luminance(), 0.0);
        assert!((Color::RED.luminance() - 0.2126).abs() < 1e-12);
        assert!((Color::GREEN.luminance() - 0.7152).abs() < 1e-12);
        assert!((Color::BLUE.luminance() - 0.0722).abs() < 1e-12);
    }
}
