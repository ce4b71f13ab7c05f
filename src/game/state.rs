//! Locomotion states and the data tables keyed by them

use serde::{Deserialize, Serialize};

/// Player locomotion/combat state. Exactly one is active per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocomotionState {
    Idle,
    Walking,
    Running,
    Crouching,
    Jumping,
    Falling,
    Aiming,
    Reloading,
    Firing,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl LocomotionState {
    pub const ALL: [LocomotionState; 9] = [
        Self::Idle,
        Self::Walking,
        Self::Running,
        Self::Crouching,
        Self::Jumping,
        Self::Falling,
        Self::Aiming,
        Self::Reloading,
        Self::Firing,
    ];

    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Jumping | Self::Falling)
    }
}

/// Horizontal speed per state (units per second)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTable {
    pub idle: f32,
    pub walking: f32,
    pub running: f32,
    pub crouching: f32,
    pub jumping: f32,
    pub falling: f32,
    pub aiming: f32,
    pub reloading: f32,
    pub firing: f32,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            idle: 0.0,
            walking: 5.0,
            running: 8.0,
            crouching: 2.5,
            jumping: 5.0,
            falling: 5.0,
            aiming: 3.0,
            reloading: 5.0,
            firing: 5.0,
        }
    }
}

impl SpeedTable {
    pub fn speed(&self, state: LocomotionState) -> f32 {
        match state {
            LocomotionState::Idle => self.idle,
            LocomotionState::Walking => self.walking,
            LocomotionState::Running => self.running,
            LocomotionState::Crouching => self.crouching,
            LocomotionState::Jumping => self.jumping,
            LocomotionState::Falling => self.falling,
            LocomotionState::Aiming => self.aiming,
            LocomotionState::Reloading => self.reloading,
            LocomotionState::Firing => self.firing,
        }
    }
}

/// States from which a grounded player may jump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JumpPolicy(Vec<LocomotionState>);

impl Default for JumpPolicy {
    fn default() -> Self {
        Self(vec![
            LocomotionState::Idle,
            LocomotionState::Walking,
            LocomotionState::Running,
            LocomotionState::Crouching,
            LocomotionState::Falling,
        ])
    }
}

impl JumpPolicy {
    pub fn allows(&self, state: LocomotionState) -> bool {
        self.0.contains(&state)
    }
}
