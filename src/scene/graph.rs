//! Scene tree stored as an arena of nodes
//!
//! Nodes refer to each other by `NodeId`. A child's `parent` link is a
//! plain id, so there is no ownership cycle; the scene owns every node.

use super::{Light, Node, NodeId, NodeKind, PlacedLight};
use crate::error::{Error, Result};
use crate::math::{EulerRotation, Mat3, Mat4, Vec3, Vec4};

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene holding only the root group
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Group)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::UnknownNode(id))
    }

    /// Create a node without attaching it anywhere
    pub fn spawn(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Create a node directly under the root
    pub fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = self.spawn(kind);
        let root = self.root;
        self.nodes[root.0].children.push(id);
        self.nodes[id.0].parent = Some(root);
        id
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes[id.0].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Move `child` under `parent`, detaching it from its previous parent
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor(child, parent) {
            return Err(Error::CyclicHierarchy { parent, child });
        }

        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Detach `id` from its parent; its subtree stays intact
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        if let Some(old) = self.node_mut(id)?.parent.take() {
            self.nodes[old.0].children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Nodes reachable from the root, parents before children and siblings
    /// in insertion order
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Refresh one node's model matrix from its parent's cached one.
    ///
    /// The parent is not refreshed first; if it is stale, so is the result.
    pub fn update_model_matrix(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        node.update_local_matrix();
        let local = node.local_matrix();
        let parent = node.parent;
        let parent_model = match parent {
            Some(parent) => self.nodes[parent.0].model_matrix,
            None => Mat4::IDENTITY,
        };
        self.nodes[id.0].model_matrix = parent_model * local;
        Ok(())
    }

    /// Refresh `id` and each of its ancestors, outermost first.
    ///
    /// Unlike `update_world_matrices` this also reaches nodes that are not
    /// attached under the root.
    pub fn update_ancestry(&mut self, id: NodeId) -> Result<()> {
        let mut chain = vec![id];
        let mut parent = self.node(id)?.parent;
        while let Some(p) = parent {
            chain.push(p);
            parent = self.nodes[p.0].parent;
        }
        for &node in chain.iter().rev() {
            self.update_model_matrix(node)?;
        }
        Ok(())
    }

    /// Refresh every node reachable from the root, parents first
    pub fn update_world_matrices(&mut self) {
        for id in self.traverse() {
            let node = &mut self.nodes[id.0];
            node.update_local_matrix();
            let local = node.local_matrix();
            let parent = node.parent;
            self.nodes[id.0].model_matrix = match parent {
                Some(parent) => self.nodes[parent.0].model_matrix * local,
                None => local,
            };
        }
    }

    /// Origin of the node in world space, from its cached model matrix
    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok((self.node(id)?.model_matrix * Vec4::new(0.0, 0.0, 0.0, 1.0)).xyz())
    }

    /// Rotate `id` so its -Z axis points at `target` (world space), keeping
    /// its `up` vector as close to vertical as possible.
    ///
    /// Uses the node's cached world position; with a parent the rotation is
    /// expressed in the parent's frame.
    pub fn look_at(&mut self, id: NodeId, target: Vec3) -> Result<()> {
        let eye = self.world_position(id)?;
        let node = self.node(id)?;
        let up = node.up;

        let forward = (eye - target).normalize()?;
        let right = match up.cross(forward).normalize() {
            Ok(r) => r,
            // Looking straight along `up`: pick any perpendicular
            Err(_) => Vec3::new(1.0, 0.0, 0.0),
        };
        let true_up = forward.cross(right);

        let world_rotation = Mat3::new(
            right.x, true_up.x, forward.x,
            right.y, true_up.y, forward.y,
            right.z, true_up.z, forward.z,
        );
        let rotation = match node.parent {
            Some(parent) => self.nodes[parent.0].model_matrix.top_left_3x3().inverse()? * world_rotation,
            None => world_rotation,
        };

        let mut m = Mat4::IDENTITY;
        for r in 0..3 {
            for c in 0..3 {
                m.set(r, c, rotation[(r, c)]);
            }
        }
        self.node_mut(id)?.rotation = EulerRotation::from_matrix_xyz(&m);
        Ok(())
    }

    /// Every light reachable from the root, placed at its world position
    pub fn lights(&self) -> Vec<PlacedLight> {
        self.traverse()
            .into_iter()
            .filter_map(|id| {
                let node = &self.nodes[id.0];
                node.light().map(|light: &Light| PlacedLight {
                    light: *light,
                    position: (node.model_matrix * Vec4::new(0.0, 0.0, 0.0, 1.0)).xyz(),
                })
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}
