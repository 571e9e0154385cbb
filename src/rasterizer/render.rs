//! The rendering pipeline
//!
//! Per frame: refresh world matrices, resolve the camera and lights, then
//! prepare one draw call per reachable mesh. Preparation computes every
//! matrix and validates every geometry before the first pixel is touched,
//! so a failing frame leaves the target as it was.
//!
//! Per triangle: vertex stage, clip, perspective divide and viewport, then
//! either fill (edge functions) or outline (Bresenham), with depth testing
//! and shading for each covered pixel.

use std::sync::Arc;

use super::clip::{clip_triangle, fan, ClipVertex};
use super::fill::TriangleSetup;
use super::line::bresenham;
use super::target::{Channel, RenderTarget};
use super::types::{Attributes, Fragment, FrontFace, RasterSettings, Uniforms, Varyings};
use crate::error::{Error, Result};
use crate::material::Material;
use crate::math::{Mat4, Vec3};
use crate::scene::{Geometry, NodeId, NodeKind, PlacedLight, Scene};

/// A clipped vertex after perspective division and viewport mapping
#[derive(Debug, Clone, Copy)]
pub struct ScreenVertex {
    /// Pixel coordinates; pixel (x, y) is sampled at integer positions
    pub x: f64,
    pub y: f64,
    /// 0 at the near plane, 1 at the far plane
    pub depth: f64,
    pub inv_w: f64,
    pub varyings: Varyings,
    /// See `ClipVertex::source_edge`
    pub source_edge: bool,
}

impl ScreenVertex {
    /// Perspective divide and viewport transform
    pub fn from_clip(v: &ClipVertex, width: usize, height: usize) -> Option<Self> {
        let w = v.position.w;
        if w <= 0.0 {
            return None;
        }
        let inv_w = 1.0 / w;
        let ndc = v.position.xyz() * inv_w;
        Some(Self {
            x: (ndc.x + 1.0) * width as f64 / 2.0 - 0.5,
            y: (1.0 - ndc.y) * height as f64 / 2.0 - 0.5,
            depth: (ndc.z + 1.0) / 2.0,
            inv_w,
            varyings: v.varyings,
            source_edge: v.source_edge,
        })
    }
}

/// Everything needed to draw one mesh with one camera
struct DrawCall {
    geometry: Arc<Geometry>,
    material: Arc<Material>,
    uniforms: Uniforms,
}

/// Counters for one frame, logged at debug level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub triangles: usize,
    pub culled: usize,
    pub clipped_away: usize,
    pub degenerate: usize,
    pub fragments_written: usize,
}

/// Software rasterizer
#[derive(Debug, Clone, Default)]
pub struct Rasterizer {
    pub settings: RasterSettings,
}

impl Rasterizer {
    pub fn new(settings: RasterSettings) -> Self {
        Self { settings }
    }

    /// Draw every mesh reachable from the scene root as seen by `camera`.
    ///
    /// The target is neither cleared nor resized; pixels no triangle covers
    /// keep their values.
    pub fn render<C: Channel>(
        &self,
        scene: &mut Scene,
        camera: NodeId,
        target: &mut RenderTarget<C>,
    ) -> Result<FrameStats> {
        scene.update_world_matrices();
        // The camera need not be attached under the root
        scene.update_ancestry(camera)?;

        let camera_node = scene.node(camera)?;
        let projection = match &camera_node.kind {
            NodeKind::Camera(c) => c.projection_matrix(),
            _ => return Err(Error::NotACamera(camera)),
        };
        let view = camera_node.model_matrix().inverse()?;
        let camera_position = scene.world_position(camera)?;

        let draws = Self::prepare(scene, view, projection, camera_position)?;
        let lights = scene.lights();

        let mut stats = FrameStats {
            draw_calls: draws.len(),
            ..Default::default()
        };
        for draw in &draws {
            for tri in draw.geometry.triangles() {
                stats.triangles += 1;
                self.draw_triangle(draw, tri, &lights, target, &mut stats)?;
            }
        }

        log::debug!(
            "Frame: {} draws, {} triangles ({} culled, {} clipped away, {} degenerate), {} fragments",
            stats.draw_calls,
            stats.triangles,
            stats.culled,
            stats.clipped_away,
            stats.degenerate,
            stats.fragments_written
        );
        Ok(stats)
    }

    fn prepare(
        scene: &Scene,
        view: Mat4,
        projection: Mat4,
        camera_position: Vec3,
    ) -> Result<Vec<DrawCall>> {
        let mut draws = Vec::new();
        for id in scene.traverse() {
            let node = scene.node(id)?;
            let Some(mesh) = node.mesh() else {
                continue;
            };
            mesh.geometry.validate()?;

            let model = node.model_matrix();
            let normal_matrix = model.top_left_3x3().inverse()?.transpose();
            draws.push(DrawCall {
                geometry: Arc::clone(&mesh.geometry),
                material: Arc::clone(&mesh.material),
                uniforms: Uniforms {
                    model,
                    view,
                    model_view: view * model,
                    projection,
                    normal_matrix,
                    camera_position,
                },
            });
        }
        Ok(draws)
    }

    fn draw_triangle<C: Channel>(
        &self,
        draw: &DrawCall,
        tri: [Attributes; 3],
        lights: &[PlacedLight],
        target: &mut RenderTarget<C>,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let material = &draw.material;
        let clip = tri.map(|a| {
            let (position, varyings) = material.vertex(&draw.uniforms, &a);
            ClipVertex::new(position, varyings)
        });

        let polygon = clip_triangle(clip);
        if polygon.is_empty() {
            stats.clipped_away += 1;
            return Ok(());
        }

        let (width, height) = (target.width(), target.height());
        let Some(screen) = polygon
            .iter()
            .map(|v| ScreenVertex::from_clip(v, width, height))
            .collect::<Option<Vec<_>>>()
        else {
            stats.clipped_away += 1;
            return Ok(());
        };

        if self.settings.wireframe || material.wireframe {
            let Some(winding) = polygon_winding(&screen) else {
                stats.degenerate += 1;
                return Ok(());
            };
            if material.cull_mode.culls(winding, draw.geometry.front_face) {
                stats.culled += 1;
                return Ok(());
            }
            for i in 0..screen.len() {
                let (a, b) = (&screen[i], &screen[(i + 1) % screen.len()]);
                // Edges made by clipping are not mesh edges
                if a.source_edge {
                    self.draw_edge(draw, a, b, lights, target, stats)?;
                }
            }
            return Ok(());
        }

        for verts in fan(&screen) {
            let Some(setup) = TriangleSetup::new(verts.map(|v| [v.x, v.y])) else {
                stats.degenerate += 1;
                continue;
            };
            if material.cull_mode.culls(setup.winding(), draw.geometry.front_face) {
                stats.culled += 1;
                continue;
            }

            let mut result = Ok(());
            setup.for_each_fragment(width, height, |frag, weights| {
                if result.is_err() {
                    return;
                }
                let depth = weights[0] * verts[0].depth + weights[1] * verts[1].depth + weights[2] * verts[2].depth;
                let weights = if self.settings.perspective_correct {
                    perspective_weights(weights, [verts[0].inv_w, verts[1].inv_w, verts[2].inv_w])
                } else {
                    weights
                };
                let varyings = Varyings::blend(&verts.map(|v| v.varyings), weights);
                result = self.write_fragment(draw, frag, depth, &varyings, lights, target, stats);
            });
            result?;
        }

        Ok(())
    }

    /// Outline one polygon edge, interpolating depth and varyings along it
    fn draw_edge<C: Channel>(
        &self,
        draw: &DrawCall,
        a: &ScreenVertex,
        b: &ScreenVertex,
        lights: &[PlacedLight],
        target: &mut RenderTarget<C>,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let p0 = Fragment::new(a.x.round() as i32, a.y.round() as i32);
        let p1 = Fragment::new(b.x.round() as i32, b.y.round() as i32);
        let points = bresenham(p0, p1);
        let steps = (points.len() - 1).max(1) as f64;

        for (k, frag) in points.into_iter().enumerate() {
            if frag.x < 0 || frag.y < 0 || frag.x as usize >= target.width() || frag.y as usize >= target.height() {
                continue;
            }
            let t = k as f64 / steps;
            let depth = a.depth + (b.depth - a.depth) * t;
            let t_varying = if self.settings.perspective_correct {
                let [_, tb] = perspective_weights2(t, a.inv_w, b.inv_w);
                tb
            } else {
                t
            };
            let varyings = a.varyings.lerp(b.varyings, t_varying);
            self.write_fragment(draw, frag, depth, &varyings, lights, target, stats)?;
        }
        Ok(())
    }

    /// Depth test, shade and store one fragment
    #[allow(clippy::too_many_arguments)]
    fn write_fragment<C: Channel>(
        &self,
        draw: &DrawCall,
        frag: Fragment,
        depth: f64,
        varyings: &Varyings,
        lights: &[PlacedLight],
        target: &mut RenderTarget<C>,
        stats: &mut FrameStats,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&depth) {
            return Ok(());
        }
        let (x, y) = (frag.x as usize, frag.y as usize);
        let material = &draw.material;

        if material.depth_test && !material.depth_func.passes(depth, target.get_depth(x, y)?) {
            return Ok(());
        }

        let color = material.shade(&draw.uniforms, varyings, lights);
        target.set_pixel(x, y, color)?;
        if material.depth_write {
            target.set_depth(x, y, depth)?;
        }
        stats.fragments_written += 1;
        Ok(())
    }
}

/// Reweight screen-space barycentrics by 1/w so attributes interpolate
/// linearly in view space
fn perspective_weights(b: [f64; 3], inv_w: [f64; 3]) -> [f64; 3] {
    let q = [b[0] * inv_w[0], b[1] * inv_w[1], b[2] * inv_w[2]];
    let sum = q[0] + q[1] + q[2];
    if sum == 0.0 {
        return b;
    }
    [q[0] / sum, q[1] / sum, q[2] / sum]
}

fn perspective_weights2(t: f64, inv_w0: f64, inv_w1: f64) -> [f64; 2] {
    let q = [(1.0 - t) * inv_w0, t * inv_w1];
    let sum = q[0] + q[1];
    if sum == 0.0 {
        return [1.0 - t, t];
    }
    [q[0] / sum, q[1] / sum]
}

/// On-screen winding of a convex polygon (shoelace, y down)
fn polygon_winding(points: &[ScreenVertex]) -> Option<FrontFace> {
    let mut area = 0.0;
    for i in 0..points.len() {
        let (a, b) = (&points[i], &points[(i + 1) % points.len()]);
        area += a.x * b.y - b.x * a.y;
    }
    if area > 0.0 {
        Some(FrontFace::Clockwise)
    } else if area < 0.0 {
        Some(FrontFace::CounterClockwise)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use crate::rasterizer::{Color, CullMode};
    use crate::scene::{Camera, Mesh};

    /// Orthographic camera at the origin looking down -Z, 2x2 view
    fn ortho_scene() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let cam = scene.insert(NodeKind::Camera(Camera::orthographic(-1.0, 1.0, 1.0, -1.0, 0.0, 10.0)));
        (scene, cam)
    }

    fn triangle(points: [Vec3; 3]) -> Geometry {
        Geometry::from_vertices(&points, &[Vec3::new(0.0, 0.0, 1.0); 3])
    }

    #[test]
    fn test_viewport_mapping() {
        let v = ClipVertex::new(Vec4::new(-1.0, 1.0, -1.0, 1.0), Varyings::default());
        let s = ScreenVertex::from_clip(&v, 8, 4).unwrap();
        assert_eq!((s.x, s.y, s.depth), (-0.5, -0.5, 0.0));
        let v = ClipVertex::new(Vec4::new(2.0, -2.0, 2.0, 2.0), Varyings::default());
        let s = ScreenVertex::from_clip(&v, 8, 4).unwrap();
        assert_eq!((s.x, s.y, s.depth, s.inv_w), (7.5, 3.5, 1.0, 0.5));
    }

    #[test]
    fn test_fullscreen_quad_covers_target() {
        let (mut scene, cam) = ortho_scene();
        let quad = scene.insert(NodeKind::Mesh(Mesh::new(
            Geometry::plane(2.0, 2.0),
            Material::solid_color(Color::GREEN),
        )));
        scene.node_mut(quad).unwrap().position = Vec3::new(0.0, 0.0, -5.0);

        let mut target: RenderTarget = RenderTarget::new(8, 6);
        let stats = Rasterizer::default().render(&mut scene, cam, &mut target).unwrap();
        assert_eq!(stats.fragments_written, 48);
        assert!(target.color_buffer().chunks(3).all(|px| px == [0, 255, 0]));
    }

    #[test]
    fn test_not_a_camera() {
        let (mut scene, _) = ortho_scene();
        let group = scene.insert(NodeKind::Group);
        let mut target: RenderTarget = RenderTarget::new(2, 2);
        assert!(matches!(
            Rasterizer::default().render(&mut scene, group, &mut target),
            Err(Error::NotACamera(_))
        ));
    }

    #[test]
    fn test_back_faces_are_culled() {
        let (mut scene, cam) = ortho_scene();
        // Clockwise as seen from the camera
        let geometry = triangle([
            Vec3::new(-0.5, 0.5, -1.0),
            Vec3::new(0.5, 0.5, -1.0),
            Vec3::new(0.0, -0.5, -1.0),
        ]);
        let mesh = scene.insert(NodeKind::Mesh(Mesh::new(geometry.clone(), Material::default())));
        let mut target: RenderTarget = RenderTarget::new(8, 8);
        let stats = Rasterizer::default().render(&mut scene, cam, &mut target).unwrap();
        assert_eq!(stats.culled, 1);
        assert!(target.color_buffer().iter().all(|&c| c == 0));

        scene.node_mut(mesh).unwrap().kind = NodeKind::Mesh(Mesh::new(
            geometry,
            Material::default().with_cull_mode(CullMode::None),
        ));
        let stats = Rasterizer::default().render(&mut scene, cam, &mut target).unwrap();
        assert_eq!(stats.culled, 0);
        assert!(stats.fragments_written > 0);
    }

    #[test]
    fn test_wireframe_draws_only_edges() {
        let (mut scene, cam) = ortho_scene();
        scene.insert(NodeKind::Mesh(Mesh::new(
            triangle([
                Vec3::new(-0.75, -0.75, -1.0),
                Vec3::new(0.75, -0.75, -1.0),
                Vec3::new(-0.75, 0.75, -1.0),
            ]),
            Material::solid_color(Color::WHITE).with_wireframe(true),
        )));
        let mut target: RenderTarget = RenderTarget::new(16, 16);
        Rasterizer::default().render(&mut scene, cam, &mut target).unwrap();

        // Corners of the outline are lit, the interior is not
        assert_eq!(target.get_pixel(2, 14).unwrap(), Color::WHITE);
        assert_eq!(target.get_pixel(2, 2).unwrap(), Color::WHITE);
        assert_eq!(target.get_pixel(14, 14).unwrap(), Color::WHITE);
        assert_eq!(target.get_pixel(8, 8).unwrap(), Color::WHITE);
        assert_eq!(target.get_pixel(4, 10).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_wireframe_skips_clipped_edges() {
        let (mut scene, cam) = ortho_scene();
        // Apex beyond the far plane (z = -10): the cut runs across the
        // middle of the screen at y = 0
        scene.insert(NodeKind::Mesh(Mesh::new(
            triangle([
                Vec3::new(-0.75, -0.75, -1.0),
                Vec3::new(0.75, -0.75, -1.0),
                Vec3::new(0.0, 0.75, -19.0),
            ]),
            Material::solid_color(Color::WHITE).with_wireframe(true),
        )));
        let mut target: RenderTarget = RenderTarget::new(16, 16);
        let stats = Rasterizer::default().render(&mut scene, cam, &mut target).unwrap();
        assert!(stats.fragments_written > 0);

        // The near edge is drawn end to end
        for x in 2..=14 {
            assert_eq!(target.get_pixel(x, 14).unwrap(), Color::WHITE, "x = {}", x);
        }
        // The slanted edges stop at x = 5 and x = 11; nothing along the cut
        // between them
        for x in 6..=10 {
            assert_eq!(target.get_pixel(x, 8).unwrap(), Color::BLACK, "x = {}", x);
        }
    }

    #[test]
    fn test_perspective_weights_favour_near_vertex() {
        let w = perspective_weights([0.5, 0.5, 0.0], [1.0, 0.25, 1.0]);
        assert!((w[0] - 0.8).abs() < 1e-12);
        assert!((w[1] - 0.2).abs() < 1e-12);
        let [a, b] = perspective_weights2(0.5, 1.0, 0.25);
        assert!((a - 0.8).abs() < 1e-12 && (b - 0.2).abs() < 1e-12);
    }
}
