//! Capability traits for collaborators the host engine provides

use uuid::Uuid;

use crate::game::presentation::{AmmoStatus, AnimationFrame};

/// Ground contact, as reported by the host's character physics
pub trait GroundSensor {
    fn is_grounded(&self) -> bool;
}

/// What a probe ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTag {
    /// A weapon lying in the world
    Pickup(Uuid),
    /// Level geometry or anything not pickable
    Untagged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub tag: HitTag,
}

/// Forward raycast from the view centre, used for pickup targeting
pub trait PickupProbe {
    fn cast_forward(&self, max_distance: f32) -> Option<RayHit>;
}

/// Receives animation parameters once per tick. Never feeds back into state.
pub trait AnimationSink: Send {
    fn present(&mut self, frame: &AnimationFrame);
}

/// HUD ammo readout
pub trait AmmoSink: Send {
    /// `None` when nothing is equipped
    fn ammo_changed(&mut self, status: Option<&AmmoStatus>);
}
