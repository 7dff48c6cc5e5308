//! Peer avatar registry.
//!
//! Avatars are created lazily: the first state update observed for an
//! unknown peer id spawns its scene node, every later update just moves
//! it. There is no removal path. The wire contract carries no departure
//! signal, so a peer that disconnects leaves its avatar standing at the
//! last received position.

use std::collections::HashMap;

use gallery_shared::net::{PeerId, PeerUpdate};
use gallery_shared::scene::{NodeId, Scene};
use tracing::debug;

/// Registry of remote viewer representations.
#[derive(Default)]
pub struct AvatarRegistry {
    avatars: HashMap<PeerId, NodeId>,
}

impl AvatarRegistry {
    /// Applies one state update, spawning the avatar on first sight.
    /// The position is always set to the most recently received value;
    /// there are no sequence numbers and no smoothing.
    pub fn apply(&mut self, scene: &mut Scene, update: &PeerUpdate) {
        let node = *self.avatars.entry(update.peer_id).or_insert_with(|| {
            debug!(peer_id = ?update.peer_id, "New peer avatar");
            scene.spawn()
        });
        if let Some(n) = scene.get_mut(node) {
            n.position = update.position;
        }
    }

    pub fn node_for(&self, peer_id: PeerId) -> Option<NodeId> {
        self.avatars.get(&peer_id).copied()
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}
