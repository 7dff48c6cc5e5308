//! Local viewer state.
//!
//! Input capture belongs to the windowing layer; this module turns
//! already-sampled movement axes into a wish velocity in yaw space and
//! tracks the local body the locomotion stepper advances.

use gallery_shared::math::Vec3;
use gallery_shared::physics::{PlayerBody, EYE_HEIGHT, WALK_SPEED};

/// Sampled movement axes, each in [-1, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    pub forward: f32,
    pub right: f32,
}

impl MoveInput {
    /// Wish velocity in world space given the camera yaw. Diagonals are
    /// normalized so they aren't faster than cardinal movement.
    pub fn wish_velocity(self, yaw: f32) -> Vec3 {
        let local = Vec3::new(self.right, 0.0, -self.forward);
        if local.len_sq() == 0.0 {
            return Vec3::ZERO;
        }
        let local = local.normalized();

        let (sin_y, cos_y) = yaw.sin_cos();
        Vec3::new(
            local.x * cos_y - local.z * sin_y,
            0.0,
            local.x * sin_y + local.z * cos_y,
        ) * WALK_SPEED
    }
}

/// The local viewer: body plus view yaw.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPlayer {
    pub body: PlayerBody,
    pub yaw: f32,
}

impl LocalPlayer {
    pub fn apply_input(&mut self, input: MoveInput) {
        self.body.velocity = input.wish_velocity(self.yaw);
    }

    /// Position broadcast to peers: body position at eye height.
    pub fn broadcast_position(&self) -> Vec3 {
        self.body.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_at_zero_yaw_is_negative_z() {
        let v = MoveInput {
            forward: 1.0,
            right: 0.0,
        }
        .wish_velocity(0.0);
        assert!((v.z - -WALK_SPEED).abs() < 1e-5);
        assert!(v.x.abs() < 1e-5);
    }

    #[test]
    fn diagonal_is_not_faster() {
        let v = MoveInput {
            forward: 1.0,
            right: 1.0,
        }
        .wish_velocity(0.0);
        assert!((v.len() - WALK_SPEED).abs() < 1e-4);
    }

    #[test]
    fn no_input_means_no_velocity() {
        assert_eq!(MoveInput::default().wish_velocity(1.2), Vec3::ZERO);
    }

    #[test]
    fn broadcast_position_is_at_eye_height() {
        let mut p = LocalPlayer::default();
        p.body.position = Vec3::new(2.0, 0.0, -3.0);
        assert_eq!(p.broadcast_position(), Vec3::new(2.0, EYE_HEIGHT, -3.0));
    }
}
