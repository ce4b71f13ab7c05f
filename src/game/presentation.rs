//! State-derived values handed to presentation sinks

use serde::Serialize;

use super::arsenal::WeaponSlot;
use super::locomotion::MotionOutput;
use super::state::LocomotionState;

/// One-shot animation cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimTrigger {
    Fire,
    Reload,
    Jump,
    Equip,
}

/// Animation parameters for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimationFrame {
    pub move_x: f32,
    pub move_y: f32,
    pub state: LocomotionState,
    pub grounded: bool,
    pub crouching: bool,
    pub aiming: bool,
    pub airborne: bool,
    pub firing: bool,
    pub reloading: bool,
    pub triggers: Vec<AnimTrigger>,
}

impl AnimationFrame {
    pub fn from_motion(motion: &MotionOutput, grounded: bool, triggers: Vec<AnimTrigger>) -> Self {
        let state = motion.state;
        Self {
            move_x: motion.anim_move.x,
            move_y: motion.anim_move.y,
            state,
            grounded,
            crouching: state == LocomotionState::Crouching,
            aiming: state == LocomotionState::Aiming,
            airborne: state.is_airborne(),
            firing: state == LocomotionState::Firing,
            reloading: state == LocomotionState::Reloading,
            triggers,
        }
    }
}

/// Ammo readout for the equipped weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmmoStatus {
    pub slot: WeaponSlot,
    pub weapon: String,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reloading: bool,
}
