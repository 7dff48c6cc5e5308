//! Scene graph (minimal).
//!
//! A deliberately small node store: the renderer lives elsewhere, so a
//! node is just an observable transform. The frame pool and the avatar
//! registry mutate nodes; nothing here blocks or suspends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Opaque scene node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// A placed object: position plus unit facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneNode {
    pub position: Vec3,
    /// Unit forward vector. Orientation is fully described by facing
    /// direction here; roll never applies to wall-mounted objects.
    pub forward: Vec3,
}

impl SceneNode {
    /// Orients the node's forward axis toward `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalized();
        if dir != Vec3::ZERO {
            self.forward = dir;
        }
    }
}

/// Node store with stable ids.
#[derive(Default)]
pub struct Scene {
    next_id: u64,
    nodes: HashMap<NodeId, SceneNode>,
}

impl Scene {
    /// Creates a node at the origin.
    pub fn spawn(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode::default());
        id
    }

    /// Removes a node. Removing an already-removed node is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
