//! Room and wall model.
//!
//! A room is an axis-aligned box. Only its four vertical walls are
//! placeable surfaces; they are derived on demand, never stored.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Immutable room dimensions. Created once at session setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Room {
    /// Creates a room, rejecting non-positive dimensions.
    pub fn new(width: f32, height: f32, depth: f32) -> anyhow::Result<Self> {
        if width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            anyhow::bail!("room dimensions must be positive: {width}x{height}x{depth}");
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// The four placeable walls, in round-robin assignment order.
    pub fn walls(&self) -> [Wall; 4] {
        [
            self.wall(WallKind::Front),
            self.wall(WallKind::Back),
            self.wall(WallKind::Left),
            self.wall(WallKind::Right),
        ]
    }

    /// Derives one wall's placement frame.
    ///
    /// Normals face into the room interior. Right-vectors are chosen so
    /// that a viewer standing inside and facing the wall agrees on which
    /// way "right" points.
    pub fn wall(&self, kind: WallKind) -> Wall {
        let half_w = self.width / 2.0;
        let half_d = self.depth / 2.0;
        let y_center = self.height / 2.0;

        match kind {
            WallKind::Front => Wall {
                kind,
                center: Vec3::new(0.0, y_center, -half_d),
                normal: Vec3::new(0.0, 0.0, 1.0),
                right: Vec3::new(1.0, 0.0, 0.0),
                span: self.width,
            },
            WallKind::Back => Wall {
                kind,
                center: Vec3::new(0.0, y_center, half_d),
                normal: Vec3::new(0.0, 0.0, -1.0),
                right: Vec3::new(-1.0, 0.0, 0.0),
                span: self.width,
            },
            WallKind::Left => Wall {
                kind,
                center: Vec3::new(-half_w, y_center, 0.0),
                normal: Vec3::new(1.0, 0.0, 0.0),
                right: Vec3::new(0.0, 0.0, -1.0),
                span: self.depth,
            },
            WallKind::Right => Wall {
                kind,
                center: Vec3::new(half_w, y_center, 0.0),
                normal: Vec3::new(-1.0, 0.0, 0.0),
                right: Vec3::new(0.0, 0.0, 1.0),
                span: self.depth,
            },
        }
    }
}

/// One of the room's four vertical surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    Front,
    Back,
    Left,
    Right,
}

impl WallKind {
    /// Round-robin target for an item index.
    pub fn for_index(index: usize) -> Self {
        match index % 4 {
            0 => WallKind::Front,
            1 => WallKind::Back,
            2 => WallKind::Left,
            _ => WallKind::Right,
        }
    }
}

/// Derived wall placement frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub kind: WallKind,
    pub center: Vec3,
    /// Unit normal, facing into the room interior.
    pub normal: Vec3,
    /// Unit in-plane right vector.
    pub right: Vec3,
    /// Usable linear extent along `right`.
    pub span: f32,
}
