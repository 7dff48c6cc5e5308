//! Frame pool reconciliation.
//!
//! The pool converges on a target item list in one synchronous pass:
//! grow, shrink, then rebind by index. Frames are fungible: after a
//! pass, frame `i` displays item `i` of the current list, with no
//! guarantee about what it displayed before. Reconciliation never
//! overlaps itself; it is invoked once per update event and runs to
//! completion.

use tracing::debug;

use crate::catalog::{frame_size, DEFAULT_FRAME_H, DEFAULT_FRAME_W};
use crate::exhibit::ExhibitItem;
use crate::layout::Placement;
use crate::scene::{NodeId, Scene};
use crate::textures::{TextureHandle, TextureStore};

/// Frame body depth in scene units.
pub const FRAME_DEPTH: f32 = 0.1;
/// Canvas is inset from the frame border on each axis, with a floor so
/// tiny frames still show something.
const CANVAS_INSET: f32 = 0.4;
const CANVAS_MIN: f32 = 0.2;
/// Canvas sits just proud of the frame body to avoid z-fighting.
pub const CANVAS_OFFSET: f32 = 0.051;

/// A pooled renderable unit bound to at most one item.
#[derive(Debug)]
pub struct Frame {
    pub node: NodeId,
    pub width: f32,
    pub height: f32,
    bound: Option<ExhibitItem>,
    texture: Option<TextureHandle>,
}

impl Frame {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            width: DEFAULT_FRAME_W,
            height: DEFAULT_FRAME_H,
            bound: None,
            texture: None,
        }
    }

    pub fn bound_item_id(&self) -> Option<&str> {
        self.bound.as_ref().map(|i| i.id.as_str())
    }

    pub fn bound_item(&self) -> Option<&ExhibitItem> {
        self.bound.as_ref()
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Inner canvas dimensions.
    pub fn canvas_size(&self) -> (f32, f32) {
        (
            (self.width - CANVAS_INSET).max(CANVAS_MIN),
            (self.height - CANVAS_INSET).max(CANVAS_MIN),
        )
    }

    fn dispose(self, scene: &mut Scene, textures: &mut TextureStore) {
        if let Some(tex) = &self.texture {
            textures.release(tex);
        }
        scene.remove(self.node);
    }
}

/// Live pool of frames tracking the most recent item list.
#[derive(Default)]
pub struct FramePool {
    frames: Vec<Frame>,
}

impl FramePool {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Converges the pool on `items`.
    ///
    /// `placements` must be the layout output for the same list. Indices
    /// with no placement are skipped entirely; prior transform and
    /// binding stay, and callers treat that as a degraded layout.
    pub fn reconcile(
        &mut self,
        scene: &mut Scene,
        textures: &mut TextureStore,
        items: &[ExhibitItem],
        placements: &[Option<Placement>],
    ) {
        if self.frames.len() != items.len() {
            debug!(from = self.frames.len(), to = items.len(), "Resizing frame pool");
        }
        while self.frames.len() < items.len() {
            self.frames.push(Frame::new(scene.spawn()));
        }
        while self.frames.len() > items.len() {
            if let Some(frame) = self.frames.pop() {
                frame.dispose(scene, textures);
            }
        }

        for (i, item) in items.iter().enumerate() {
            let Some(placement) = placements.get(i).copied().flatten() else {
                continue;
            };
            let frame = &mut self.frames[i];

            if let Some(node) = scene.get_mut(frame.node) {
                node.position = placement.position;
                node.look_at(placement.position + placement.normal);
            }

            let (w, h) = frame_size(item);
            frame.width = w;
            frame.height = h;

            // Any change to the bound item reloads content; identity at
            // the id level is not exploited for partial updates.
            if frame.bound.as_ref() != Some(item) {
                if let Some(old) = frame.texture.take() {
                    textures.release(&old);
                }
                frame.texture = Some(textures.acquire(&item.url));
                frame.bound = Some(item.clone());
            }
        }
    }

    /// Removes every frame and its resources.
    pub fn clear(&mut self, scene: &mut Scene, textures: &mut TextureStore) {
        for frame in self.frames.drain(..) {
            frame.dispose(scene, textures);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutOptions};
    use crate::room::Room;

    fn item(id: &str, url: &str) -> ExhibitItem {
        ExhibitItem {
            id: id.to_string(),
            title: String::new(),
            reason: String::new(),
            url: url.to_string(),
            size_hint_w: None,
            size_hint_h: None,
        }
    }

    fn fixture(n: usize) -> (Room, Vec<ExhibitItem>, Vec<Option<Placement>>) {
        let room = Room::new(30.0, 30.0, 30.0).unwrap();
        let items: Vec<_> = (0..n)
            .map(|i| item(&format!("F{i}"), &format!("img/{i}.jpg")))
            .collect();
        let placements = compute_layout(n, &room, &LayoutOptions::default());
        (room, items, placements)
    }

    #[test]
    fn pool_grows_to_item_count() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();
        let (_, items, placements) = fixture(5);

        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        assert_eq!(pool.len(), 5);
        assert_eq!(scene.len(), 5);
        assert_eq!(tex.live_count(), 5);
    }

    #[test]
    fn pool_shrinks_and_releases() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, items5, placements5) = fixture(5);
        pool.reconcile(&mut scene, &mut tex, &items5, &placements5);

        let (_, items2, placements2) = fixture(2);
        pool.reconcile(&mut scene, &mut tex, &items2, &placements2);
        assert_eq!(pool.len(), 2);
        assert_eq!(scene.len(), 2);
        assert_eq!(tex.live_count(), 2);
    }

    #[test]
    fn reconcile_to_empty_clears_pool() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, items, placements) = fixture(3);
        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        pool.reconcile(&mut scene, &mut tex, &[], &[]);
        assert_eq!(pool.len(), 0);
        assert_eq!(scene.len(), 0);
        assert_eq!(tex.live_count(), 0);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, items, placements) = fixture(4);
        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        let loads = tex.load_count();
        let pos: Vec<_> = (0..4)
            .map(|i| scene.get(pool.get(i).unwrap().node).unwrap().position)
            .collect();

        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        assert_eq!(pool.len(), 4);
        // Identical content: no further loads, no transform drift.
        assert_eq!(tex.load_count(), loads);
        for (i, p) in pos.iter().enumerate() {
            assert_eq!(scene.get(pool.get(i).unwrap().node).unwrap().position, *p);
        }
    }

    #[test]
    fn metadata_change_reloads_content() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, mut items, placements) = fixture(2);
        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        let loads = tex.load_count();

        // Same id and url, new title: still a full rebind.
        items[0].title = "retitled".to_string();
        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        assert_eq!(tex.load_count(), loads + 1);
        assert_eq!(tex.live_count(), 2);
    }

    #[test]
    fn frames_face_away_from_wall() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, items, placements) = fixture(4);
        pool.reconcile(&mut scene, &mut tex, &items, &placements);

        for (i, p) in placements.iter().enumerate() {
            let p = p.unwrap();
            let node = scene.get(pool.get(i).unwrap().node).unwrap();
            assert_eq!(node.position, p.position);
            assert_eq!(node.forward, p.normal);
        }
    }

    #[test]
    fn missing_placement_skips_frame() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, items, placements) = fixture(2);
        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        let before = scene.get(pool.get(1).unwrap().node).unwrap().position;

        let mut degraded = placements.clone();
        degraded[1] = None;
        let moved: Vec<_> = items
            .iter()
            .cloned()
            .map(|mut it| {
                it.url = format!("v2/{}", it.url);
                it
            })
            .collect();
        pool.reconcile(&mut scene, &mut tex, &moved, &degraded);

        // Index 0 rebound; index 1 untouched, including its content.
        assert_eq!(pool.get(0).unwrap().texture().unwrap().url(), "v2/img/0.jpg");
        assert_eq!(pool.get(1).unwrap().texture().unwrap().url(), "img/1.jpg");
        assert_eq!(scene.get(pool.get(1).unwrap().node).unwrap().position, before);
    }

    #[test]
    fn canvas_insets_with_floor() {
        let mut frame = Frame::new(NodeId(0));
        frame.width = 4.4;
        frame.height = 3.2;
        let (cw, ch) = frame.canvas_size();
        assert!((cw - 4.0).abs() < 1e-5);
        assert!((ch - 2.8).abs() < 1e-5);

        frame.width = 0.3;
        frame.height = 0.3;
        assert_eq!(frame.canvas_size(), (CANVAS_MIN, CANVAS_MIN));
    }

    #[test]
    fn grow_from_existing_pool_binds_current_list() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();

        let (_, items2, placements2) = fixture(2);
        pool.reconcile(&mut scene, &mut tex, &items2, &placements2);

        let (_, items6, placements6) = fixture(6);
        pool.reconcile(&mut scene, &mut tex, &items6, &placements6);
        assert_eq!(pool.len(), 6);
        for i in 0..6 {
            assert_eq!(pool.get(i).unwrap().bound_item_id(), Some(format!("F{i}")).as_deref());
        }
    }

    #[test]
    fn clear_disposes_everything() {
        let mut scene = Scene::default();
        let mut tex = TextureStore::default();
        let mut pool = FramePool::default();
        let (_, items, placements) = fixture(3);
        pool.reconcile(&mut scene, &mut tex, &items, &placements);
        pool.clear(&mut scene, &mut tex);
        assert!(pool.is_empty());
        assert!(scene.is_empty());
        assert_eq!(tex.live_count(), 0);
    }
}
