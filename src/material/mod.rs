//! Materials: the programmable stages of the pipeline
//!
//! A material supplies the vertex stage (object space to clip space) and
//! the fragment stage (interpolated varyings to a color), plus the fixed
//! function state the rasterizer consults per draw: culling, depth testing
//! and fill mode.

use serde::{Deserialize, Serialize};

use crate::math::{Vec3, Vec4};
use crate::rasterizer::{Attributes, Color, CullMode, DepthFunc, Uniforms, Varyings};
use crate::scene::PlacedLight;

/// Shading model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// One flat color, unlit
    SolidColor(Color),
    /// Unit world-space normal, absolute value per axis, as RGB
    NormalColor,
    /// Lit by every scene light
    BlinnPhong {
        diffuse: Color,
        specular: Color,
        shininess: f64,
    },
}

/// A lit point on a surface, in world space
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub position: Vec3,
    pub normal: Vec3,
    /// Unit vector towards the camera
    pub view_direction: Vec3,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub kind: MaterialKind,
    pub cull_mode: CullMode,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: DepthFunc,
    /// Draw triangle outlines instead of filling
    pub wireframe: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::SolidColor(Color::WHITE),
            cull_mode: CullMode::default(),
            depth_test: true,
            depth_write: true,
            depth_func: DepthFunc::default(),
            wireframe: false,
        }
    }
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn solid_color(color: Color) -> Self {
        Self::new(MaterialKind::SolidColor(color))
    }

    pub fn normal_color() -> Self {
        Self::new(MaterialKind::NormalColor)
    }

    pub fn blinn_phong(diffuse: Color, specular: Color, shininess: f64) -> Self {
        Self::new(MaterialKind::BlinnPhong {
            diffuse,
            specular,
            shininess,
        })
    }

    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    /// Vertex stage: clip-space position and the varyings to interpolate
    pub fn vertex(&self, uniforms: &Uniforms, attributes: &Attributes) -> (Vec4, Varyings) {
        let clip = uniforms.projection * uniforms.model_view * Vec4::from_vec3(attributes.local_position, 1.0);
        (clip, Varyings::from(*attributes))
    }

    /// Fragment stage
    pub fn shade(&self, uniforms: &Uniforms, varyings: &Varyings, lights: &[PlacedLight]) -> Color {
        match &self.kind {
            MaterialKind::SolidColor(color) => *color,
            MaterialKind::NormalColor => (uniforms.normal_matrix * varyings.local_normal)
                .normalize()
                .map(|n| Color::from_vec3(n.abs()))
                .unwrap_or(Color::BLACK),
            MaterialKind::BlinnPhong {
                diffuse,
                specular,
                shininess,
            } => {
                let position = uniforms.model.transform_point(varyings.local_position);
                let normal = uniforms.normal_matrix * varyings.local_normal;
                let surface = Surface {
                    position,
                    // Unnormalizable vectors are left as-is; lights skip them
                    normal: normal.normalize().unwrap_or(normal),
                    view_direction: (uniforms.camera_position - position)
                        .normalize()
                        .unwrap_or(Vec3::ZERO),
                    diffuse: *diffuse,
                    specular: *specular,
                    shininess: *shininess,
                };

                lights
                    .iter()
                    .fold(Color::BLACK, |acc, light| acc + light.contribute(&surface))
            }
        }
    }
}
