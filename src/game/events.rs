//! Gameplay events emitted by the controller each tick

use serde::Serialize;
use uuid::Uuid;

use super::arsenal::WeaponSlot;
use super::state::LocomotionState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    StateChanged {
        from: LocomotionState,
        to: LocomotionState,
    },
    Fired {
        weapon: String,
        slot: WeaponSlot,
        ammo_left: u32,
    },
    ReloadStarted {
        weapon: String,
        slot: WeaponSlot,
    },
    ReloadFinished {
        weapon_id: Uuid,
    },
    WeaponEquipped {
        weapon: String,
        slot: WeaponSlot,
    },
    WeaponPickedUp {
        weapon: String,
        slot: WeaponSlot,
    },
    WeaponDropped {
        weapon: String,
        pickup_id: Uuid,
    },
    WeaponDestroyed {
        weapon: String,
    },
    Jumped {
        impulse: f32,
    },
}
