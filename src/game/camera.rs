//! View angles from the look axis

use serde::{Deserialize, Serialize};

use crate::input::Axis2;

/// Look tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookTuning {
    /// Degrees per second per unit of look input
    pub sensitivity: f32,
    /// Maximum pitch above/below the horizon (degrees)
    pub clamp_angle: f32,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            sensitivity: 100.0,
            clamp_angle: 60.0,
        }
    }
}

/// Camera pitch and body yaw, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ViewAngles {
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Debug)]
pub struct LookController {
    tuning: LookTuning,
    angles: ViewAngles,
}

impl LookController {
    pub fn new(tuning: LookTuning) -> Self {
        Self {
            tuning,
            angles: ViewAngles::default(),
        }
    }

    pub fn angles(&self) -> ViewAngles {
        self.angles
    }

    pub fn update(&mut self, look: Axis2, dt: f32) -> ViewAngles {
        let dx = look.x * self.tuning.sensitivity * dt;
        let dy = look.y * self.tuning.sensitivity * dt;

        let limit = self.tuning.clamp_angle.abs();
        self.angles.pitch = (self.angles.pitch - dy).clamp(-limit, limit);
        self.angles.yaw = (self.angles.yaw + dx).rem_euclid(360.0);
        self.angles
    }
}
