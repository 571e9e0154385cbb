//! Light sources

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::material::Surface;
use crate::math::Vec3;
use crate::rasterizer::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    /// Uniform light from every direction; only tints the diffuse color
    Ambient { color: Color, intensity: f64 },
    /// Emits from its node's world position in all directions, falling off
    /// with the squared distance
    Point { color: Color, intensity: f64 },
}

impl Light {
    pub fn ambient(color: Color, intensity: f64) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn point(color: Color, intensity: f64) -> Self {
        Light::Point { color, intensity }
    }

    pub fn color(&self) -> Color {
        match *self {
            Light::Ambient { color, .. } | Light::Point { color, .. } => color,
        }
    }

    /// Radiant power of a point light (unitless intensity over the sphere)
    pub fn power(&self) -> f64 {
        match *self {
            Light::Ambient { intensity, .. } | Light::Point { intensity, .. } => intensity * 4.0 * PI,
        }
    }

    /// Blinn-Phong contribution of this light at `surface`.
    ///
    /// `position` is the light's world position (ignored for ambient light).
    /// A surface point sitting exactly on the light, or a zero normal,
    /// receives no direct light.
    pub fn contribute(&self, position: Vec3, surface: &Surface) -> Color {
        match *self {
            Light::Ambient { color, intensity } => color * intensity * surface.diffuse,
            Light::Point { color, .. } => {
                let to_light = position - surface.position;
                let distance_squared = to_light.length_squared();
                let (Ok(l), Ok(n)) = (to_light.normalize(), surface.normal.normalize()) else {
                    return Color::BLACK;
                };

                let lambertian = l.dot(n).max(0.0);
                let mut specular = 0.0;
                if lambertian > 0.0 {
                    // View direction may vanish when the eye sits on the surface
                    if let Ok(h) = (l + surface.view_direction).normalize() {
                        specular = h.dot(n).max(0.0).powf(surface.shininess);
                    }
                }

                let falloff = self.power() / distance_squared;
                (surface.diffuse * lambertian + surface.specular * specular) * color * falloff
            }
        }
    }
}

/// A light resolved to world space for one frame
#[derive(Debug, Clone, Copy)]
pub struct PlacedLight {
    pub light: Light,
    pub position: Vec3,
}

impl PlacedLight {
    pub fn contribute(&self, surface: &Surface) -> Color {
        self.light.contribute(self.position, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface {
            position: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.0, 1.0),
            view_direction: Vec3::new(0.0, 0.0, 1.0),
            diffuse: Color::new(0.5, 0.5, 0.5),
            specular: Color::WHITE,
            shininess: 16.0,
        }
    }

    #[test]
    fn test_ambient_tints_diffuse() {
        let c = Light::ambient(Color::new(1.0, 0.5, 0.0), 0.5).contribute(Vec3::ZERO, &surface());
        assert!((c.r - 0.25).abs() < 1e-12);
        assert!((c.g - 0.125).abs() < 1e-12);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_point_light_head_on() {
        // Light straight above at distance 2: lambertian 1, specular 1
        let light = Light::point(Color::WHITE, 1.0);
        let c = light.contribute(Vec3::new(0.0, 0.0, 2.0), &surface());
        let expected = (0.5 + 1.0) * 4.0 * PI / 4.0;
        assert!((c.r - expected).abs() < 1e-9);
    }

    #[test]
    fn test_point_light_behind_surface() {
        let light = Light::point(Color::WHITE, 1.0);
        let c = light.contribute(Vec3::new(0.0, 0.0, -2.0), &surface());
        assert_eq!(c, Color::BLACK);
    }

    #[test]
    fn test_light_on_surface_is_skipped() {
        let light = Light::point(Color::WHITE, 1.0);
        assert_eq!(light.contribute(Vec3::ZERO, &surface()), Color::BLACK);
    }
}
