use bevy::math::Vec2;

use crate::board::{CARD_HEIGHT, CARD_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH};

// Finale tuning, in pixels per physics step (the driver runs at PHYSICS_HZ).
pub const PHYSICS_HZ: f32 = 300.0;
pub const LAUNCH_VELOCITY: Vec2 = Vec2::new(0.3, -3.0);
pub const GRAVITY_PER_STEP: f32 = 0.05;
pub const RESTITUTION: f32 = 0.85;

/// Card center height at which the card rests on the bottom window edge.
pub const FLOOR_Y: f32 = CARD_HEIGHT / 2.0 - WINDOW_HEIGHT / 2.0;

/// A card once its left edge has cleared the right window edge is done.
pub fn exited(center_x: f32) -> bool {
    center_x - CARD_WIDTH / 2.0 > WINDOW_WIDTH / 2.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingBody {
    pub center: Vec2,
    pub vel: Vec2,
}

/// One physics step: advance by velocity, pull down by gravity, and reflect
/// off the floor with damping. Returns the post-bounce vertical speed on
/// impact so the caller can scale the bounce sound.
pub fn integrate(body: &mut FallingBody, floor_y: f32) -> Option<f32> {
    body.center += body.vel;
    body.vel.y -= GRAVITY_PER_STEP;
    if body.center.y <= floor_y {
        body.center.y = floor_y;
        body.vel.y = -body.vel.y * RESTITUTION;
        Some(body.vel.y.abs())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::slot_center;

    #[test]
    fn free_fall_accelerates_downward() {
        let mut body = FallingBody {
            center: Vec2::new(0.0, 100.0),
            vel: LAUNCH_VELOCITY,
        };
        assert_eq!(integrate(&mut body, FLOOR_Y), None);
        assert_eq!(body.center, Vec2::new(0.3, 97.0));
        assert!((body.vel - Vec2::new(0.3, -3.05)).length() < 1e-5);
    }

    #[test]
    fn floor_impact_clamps_and_damps() {
        let mut body = FallingBody {
            center: Vec2::new(0.0, FLOOR_Y + 1.0),
            vel: Vec2::new(0.3, -3.0),
        };
        let impact = integrate(&mut body, FLOOR_Y);
        assert_eq!(body.center.y, FLOOR_Y);
        assert!(body.vel.y > 0.0);
        let expected = 3.05 * RESTITUTION;
        assert!((body.vel.y - expected).abs() < 1e-5);
        assert!((impact.unwrap() - expected).abs() < 1e-5);
    }

    #[test]
    fn exit_requires_fully_clearing_the_right_edge() {
        assert!(!exited(WINDOW_WIDTH / 2.0));
        assert!(!exited(WINDOW_WIDTH / 2.0 + CARD_WIDTH / 2.0));
        assert!(exited(WINDOW_WIDTH / 2.0 + CARD_WIDTH / 2.0 + 0.1));
    }

    #[test]
    fn launched_card_bounces_along_the_floor_and_exits() {
        let mut body = FallingBody {
            center: slot_center(0),
            vel: LAUNCH_VELOCITY,
        };
        let mut bounced = false;
        for _ in 0..500_000 {
            if let Some(impact) = integrate(&mut body, FLOOR_Y) {
                bounced = true;
                assert!(impact >= 0.0);
            }
            assert!(body.center.y >= FLOOR_Y);
            if exited(body.center.x) {
                break;
            }
        }
        assert!(bounced);
        assert!(exited(body.center.x));
    }
}
