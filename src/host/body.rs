//! Kinematic character body on a flat floor

use crate::game::camera::ViewAngles;
use crate::game::locomotion::MotionOutput;
use crate::math::Vec3;
use crate::ports::GroundSensor;

/// Body integration constants
#[derive(Debug, Clone, Copy)]
pub struct BodyStats {
    /// Floor height
    pub floor: f32,
    /// Contact tolerance above the floor
    pub skin: f32,
}

impl Default for BodyStats {
    fn default() -> Self {
        Self {
            floor: 0.0,
            skin: 0.01,
        }
    }
}

/// Moves the player with the controller's velocities and reports ground contact
#[derive(Debug, Clone)]
pub struct KinematicBody {
    stats: BodyStats,
    position: Vec3,
    grounded: bool,
}

impl KinematicBody {
    pub fn new(position: Vec3, stats: BodyStats) -> Self {
        let grounded = position.y <= stats.floor + stats.skin;
        Self {
            stats,
            position,
            grounded,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Apply one tick of motion. Planar velocity is in the body frame and is
    /// rotated by the view yaw (0 = +z).
    pub fn integrate(&mut self, motion: &MotionOutput, view: ViewAngles, dt: f32) {
        let forward = Vec3::forward_from_yaw(view.yaw);
        let right = Vec3::forward_from_yaw(view.yaw + 90.0);

        let planar = forward
            .scale(motion.planar_velocity.y)
            .add(right.scale(motion.planar_velocity.x));
        self.position = self.position.add(planar.scale(dt));
        self.position.y += motion.vertical_velocity * dt;

        // Clamp to the floor
        if self.position.y <= self.stats.floor + self.stats.skin {
            self.position.y = self.stats.floor;
            self.grounded = motion.vertical_velocity <= 0.0;
        } else {
            self.grounded = false;
        }
    }

    /// Eye position for a camera height above the feet
    pub fn eye(&self, camera_height: f32) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y + camera_height,
            self.position.z,
        )
    }
}

impl GroundSensor for KinematicBody {
    fn is_grounded(&self) -> bool {
        self.grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::LocomotionState;
    use crate::input::Axis2;

    fn motion(planar: Axis2, vertical: f32, jump: Option<f32>) -> MotionOutput {
        MotionOutput {
            previous: LocomotionState::Idle,
            state: LocomotionState::Walking,
            horizontal_speed: planar.length(),
            planar_velocity: planar,
            vertical_velocity: vertical,
            jump_impulse: jump,
            height: 2.0,
            camera_height: 1.6,
            anim_move: Axis2::ZERO,
        }
    }

    #[test]
    fn walks_along_view_yaw() {
        let mut body = KinematicBody::new(Vec3::ZERO, BodyStats::default());
        let view = ViewAngles {
            pitch: 0.0,
            yaw: 90.0,
        };
        body.integrate(&motion(Axis2::new(0.0, 5.0), -2.0, None), view, 1.0);

        let pos = body.position();
        assert!((pos.x - 5.0).abs() < 1e-4);
        assert!(pos.z.abs() < 1e-4);
        assert_eq!(pos.y, 0.0);
        assert!(body.is_grounded());
    }

    #[test]
    fn jump_leaves_the_floor_and_lands() {
        let mut body = KinematicBody::new(Vec3::ZERO, BodyStats::default());
        let view = ViewAngles::default();
        body.integrate(&motion(Axis2::ZERO, 10.0, Some(10.0)), view, 0.1);
        assert!(!body.is_grounded());
        assert!(body.position().y > 0.0);

        body.integrate(&motion(Axis2::ZERO, -20.0, None), view, 0.1);
        assert!(body.is_grounded());
        assert_eq!(body.position().y, 0.0);
    }
}
