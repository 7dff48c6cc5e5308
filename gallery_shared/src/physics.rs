//! Locomotion abstraction.
//!
//! The viewer's collision/locomotion is an opaque stepped simulator as
//! far as the rest of the system is concerned: the sync loop only reads
//! a position out of it. `RoomWalk` is the concrete stepper used by the
//! client binary; `NullLocomotion` keeps headless tests deterministic.

use crate::math::Vec3;
use crate::room::Room;

/// Eye height added to the body position for the camera/avatar.
pub const EYE_HEIGHT: f32 = 1.6;

/// Ground walk speed in units per second.
pub const WALK_SPEED: f32 = 3.0;

/// A movable body: position plus horizontal velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerBody {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Stepped locomotion backend.
pub trait Locomotion: Send + Sync {
    fn step(&mut self, body: &mut PlayerBody, dt_sec: f32);
}

/// No-op locomotion.
#[derive(Default)]
pub struct NullLocomotion;

impl Locomotion for NullLocomotion {
    fn step(&mut self, _body: &mut PlayerBody, _dt_sec: f32) {}
}

/// Damped walking confined to the room interior.
pub struct RoomWalk {
    room: Room,
    /// Velocity retained per step; the rest bleeds off as damping.
    damping: f32,
    /// Clearance kept between the body and each wall.
    margin: f32,
}

impl RoomWalk {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            damping: 0.9,
            margin: 0.3,
        }
    }
}

impl Locomotion for RoomWalk {
    fn step(&mut self, body: &mut PlayerBody, dt_sec: f32) {
        body.position = body.position + body.velocity * dt_sec;
        body.velocity = body.velocity * self.damping;

        let half_w = self.room.width / 2.0 - self.margin;
        let half_d = self.room.depth / 2.0 - self.margin;
        body.position.x = body.position.x.clamp(-half_w, half_w);
        body.position.z = body.position.z.clamp(-half_d, half_d);
        body.position.y = 0.0;
    }
}
