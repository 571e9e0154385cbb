//! Scene description files (RON)
//!
//! A scene file names the output size, a camera and a tree of nodes. It is
//! plain data; `SceneFile::build` turns it into a live `Scene`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Camera, Geometry, Light, Mesh, NodeId, NodeKind, Projection, Scene};
use crate::error::Result;
use crate::material::Material;
use crate::math::{EulerRotation, Vec3};
use crate::rasterizer::{Color, RasterSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub background: Color,
    pub camera: CameraDesc,
    #[serde(default)]
    pub settings: RasterSettings,
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    pub projection: Projection,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: EulerRotation,
    /// World point to face; overrides `rotation`
    #[serde(default)]
    pub look_at: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: EulerRotation,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    pub kind: NodeDescKind,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeDescKind {
    Group { children: Vec<NodeDesc> },
    Mesh { geometry: GeometryDesc, material: Material },
    Light(Light),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryDesc {
    Cuboid { width: f64, height: f64, depth: f64 },
    Plane { width: f64, height: f64 },
    /// Raw buffers
    Buffers(Geometry),
}

impl GeometryDesc {
    pub fn build(&self) -> Geometry {
        match self {
            GeometryDesc::Cuboid { width, height, depth } => Geometry::cuboid(*width, *height, *depth),
            GeometryDesc::Plane { width, height } => Geometry::plane(*width, *height),
            GeometryDesc::Buffers(g) => g.clone(),
        }
    }
}

/// A scene ready to render, with the settings it was saved with
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Scene,
    pub camera: NodeId,
    pub width: usize,
    pub height: usize,
    pub background: Color,
    pub settings: RasterSettings,
}

impl SceneFile {
    /// Instantiate every node under a fresh root
    pub fn build(&self) -> Result<LoadedScene> {
        let mut scene = Scene::new();
        let root = scene.root();
        for desc in &self.nodes {
            add_node(&mut scene, root, desc)?;
        }

        let camera = scene.insert(NodeKind::Camera(Camera::new(self.camera.projection)));
        {
            let node = scene.node_mut(camera)?;
            node.position = self.camera.position;
            node.rotation = self.camera.rotation;
        }
        if let Some(target) = self.camera.look_at {
            scene.update_world_matrices();
            scene.look_at(camera, target)?;
        }
        scene.update_world_matrices();

        log::debug!("Built scene with {} nodes", scene.len());
        Ok(LoadedScene {
            scene,
            camera,
            width: self.width,
            height: self.height,
            background: self.background,
            settings: self.settings.clone(),
        })
    }
}

fn add_node(scene: &mut Scene, parent: NodeId, desc: &NodeDesc) -> Result<NodeId> {
    let kind = match &desc.kind {
        NodeDescKind::Group { .. } => NodeKind::Group,
        NodeDescKind::Mesh { geometry, material } => {
            NodeKind::Mesh(Mesh::new(geometry.build(), material.clone()))
        }
        NodeDescKind::Light(light) => NodeKind::Light(*light),
    };

    let id = scene.spawn(kind);
    {
        let node = scene.node_mut(id)?;
        node.position = desc.position;
        node.rotation = desc.rotation;
        node.scale = desc.scale;
    }
    scene.add(parent, id)?;

    if let NodeDescKind::Group { children } = &desc.kind {
        for child in children {
            add_node(scene, id, child)?;
        }
    }
    Ok(id)
}

/// Load a scene description from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneFile> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene description from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneFile> {
    Ok(ron::from_str(s)?)
}

/// Save a scene description to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneFile, path: P) -> Result<()> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(6)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SCENE: &str = r#"
        SceneFile(
            width: 64,
            height: 48,
            background: (r: 0.1, g: 0.1, b: 0.2),
            camera: (
                projection: Perspective(fov_y: 1.0, aspect: 1.333, near: 0.1, far: 100.0),
                position: (x: 0.0, y: 1.0, z: 5.0),
                look_at: Some((x: 0.0, y: 0.0, z: 0.0)),
            ),
            nodes: [
                (
                    position: (x: 0.0, y: 3.0, z: 0.0),
                    kind: Light(Point(color: (r: 1.0, g: 1.0, b: 1.0), intensity: 2.0)),
                ),
                (
                    kind: Group(children: [
                        (
                            kind: Mesh(
                                geometry: Cuboid(width: 1.0, height: 1.0, depth: 1.0),
                                material: (kind: NormalColor),
                            ),
                        ),
                    ]),
                ),
            ],
        )
    "#;

    #[test]
    fn test_parse_and_build() {
        let file = load_scene_from_str(SCENE).unwrap();
        assert_eq!(file.width, 64);
        assert!(file.settings.perspective_correct);
        assert_eq!(file.nodes[0].scale, Vec3::ONE);

        let loaded = file.build().unwrap();
        // root, light, group, mesh, camera
        assert_eq!(loaded.scene.len(), 5);
        assert!(loaded.scene.node(loaded.camera).unwrap().camera().is_some());
        assert_eq!(loaded.scene.lights()[0].position, Vec3::new(0.0, 3.0, 0.0));

        let mesh = loaded
            .scene
            .iter()
            .find_map(|(_, n)| n.mesh())
            .unwrap();
        assert_eq!(mesh.material.kind, crate::material::MaterialKind::NormalColor);
        assert_eq!(mesh.geometry.triangle_count(), 12);
    }

    #[test]
    fn test_round_trip_through_disk() {
        let file = load_scene_from_str(SCENE).unwrap();
        let path = std::env::temp_dir().join(format!("softraster_scene_{}.ron", std::process::id()));
        save_scene(&file, &path).unwrap();
        let back = load_scene(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, file);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(load_scene_from_str("SceneFile(width: )"), Err(Error::ParseError(_))));
        assert!(matches!(load_scene("/nonexistent/scene.ron"), Err(Error::IoError(_))));
    }
}
