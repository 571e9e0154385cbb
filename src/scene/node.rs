//! Scene nodes

use std::sync::Arc;

use super::{Camera, Geometry, Light};
use crate::material::Material;
use crate::math::{EulerRotation, Mat4, Vec3};

/// Handle to a node inside a `Scene`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Drawable: shared geometry plus the material to draw it with
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material: Arc::new(material),
        }
    }

    pub fn shared(geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self { geometry, material }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Transform-only node
    Group,
    Camera(Camera),
    Light(Light),
    Mesh(Mesh),
}

/// One object in the scene tree
///
/// The local transform is stored as position, rotation and scale. The
/// matrices are caches: `local_matrix` is refreshed by
/// `update_local_matrix`, `model_matrix` by the owning scene.
#[derive(Debug, Clone)]
pub struct Node {
    pub position: Vec3,
    pub rotation: EulerRotation,
    pub scale: Vec3,
    pub up: Vec3,
    pub kind: NodeKind,
    local_matrix: Mat4,
    pub(crate) model_matrix: Mat4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: EulerRotation::IDENTITY,
            scale: Vec3::ONE,
            up: Vec3::UP,
            kind,
            local_matrix: Mat4::IDENTITY,
            model_matrix: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.position += offset;
        self
    }

    pub fn rotate(&mut self, rotation: EulerRotation) -> &mut Self {
        self.rotation = self.rotation + rotation;
        self
    }

    /// Multiply the current scale componentwise
    pub fn scale_by(&mut self, factor: Vec3) -> &mut Self {
        self.scale *= factor;
        self
    }

    /// Recompute `T * R * S` from position, rotation and scale
    pub fn update_local_matrix(&mut self) {
        self.local_matrix = Mat4::from_translation(self.position)
            * Mat4::from_rotation(self.rotation)
            * Mat4::from_scale(self.scale);
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    /// Local-to-world transform as of the last scene update
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            NodeKind::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }
}
