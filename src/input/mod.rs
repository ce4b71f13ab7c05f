//! Per-tick player intent
//!
//! The producer (device callbacks, network, a bot) writes into an
//! [`InputHandler`]; the controller reads a snapshot once per tick and then
//! calls [`InputHandler::consume_actions`] to clear the edge-triggered flags.

use serde::{Deserialize, Serialize};

use crate::game::arsenal::WeaponSlot;

/// Two-component input axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis2 {
    pub x: f32,
    pub y: f32,
}

impl Axis2 {
    pub const ZERO: Axis2 = Axis2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Clamp to unit length so diagonals are not faster
    pub fn clamped(self) -> Self {
        let len = self.length();
        if len > 1.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            self
        }
    }
}

/// Requested weapon change for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwitchRequest {
    /// Equip a specific slot
    Slot { slot: WeaponSlot },
    /// Walk the occupied slots (positive = forward)
    Cycle { delta: i32 },
}

/// Intent for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub move_axis: Axis2,
    pub look_axis: Axis2,

    // Held while the button is down
    pub sprint: bool,
    pub crouch: bool,
    pub aim: bool,

    // Edge-triggered, true for exactly one tick
    pub jump: bool,
    pub fire: bool,
    pub reload: bool,
    pub pickup: bool,
    pub discard: bool,
    pub switch: Option<SwitchRequest>,
}

impl InputSnapshot {
    pub fn has_movement(&self) -> bool {
        !self.move_axis.is_zero()
    }
}

/// Input events as produced by a device layer or sent over a session channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Move { x: f32, y: f32 },
    Look { x: f32, y: f32 },
    Sprint { held: bool },
    Crouch { held: bool },
    Aim { held: bool },
    Jump,
    Fire,
    Reload,
    Pickup,
    Discard,
    SelectSlot { slot: WeaponSlot },
    CycleWeapon { delta: i32 },
}

/// Accumulates input between ticks
#[derive(Debug, Default)]
pub struct InputHandler {
    current: InputSnapshot,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event. Edge flags latch until the next `consume_actions`.
    pub fn apply(&mut self, event: InputEvent) {
        let input = &mut self.current;
        match event {
            InputEvent::Move { x, y } => input.move_axis = Axis2::new(x, y),
            InputEvent::Look { x, y } => input.look_axis = Axis2::new(x, y),
            InputEvent::Sprint { held } => input.sprint = held,
            InputEvent::Crouch { held } => input.crouch = held,
            InputEvent::Aim { held } => input.aim = held,
            InputEvent::Jump => input.jump = true,
            InputEvent::Fire => input.fire = true,
            InputEvent::Reload => input.reload = true,
            InputEvent::Pickup => input.pickup = true,
            InputEvent::Discard => input.discard = true,
            InputEvent::SelectSlot { slot } => {
                input.switch = Some(SwitchRequest::Slot { slot });
            }
            InputEvent::CycleWeapon { delta } => {
                input.switch = Some(SwitchRequest::Cycle { delta });
            }
        }
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.current
    }

    /// Clear edge-triggered flags. Held state and axes persist.
    pub fn consume_actions(&mut self) {
        let input = &mut self.current;
        input.jump = false;
        input.fire = false;
        input.reload = false;
        input.pickup = false;
        input.discard = false;
        input.switch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_flags_survive_until_consumed() {
        let mut handler = InputHandler::new();
        handler.apply(InputEvent::Jump);
        handler.apply(InputEvent::Fire);
        handler.apply(InputEvent::SelectSlot {
            slot: WeaponSlot::Secondary,
        });

        assert!(handler.snapshot().jump);
        assert!(handler.snapshot().fire);
        // Reading does not clear
        assert!(handler.snapshot().jump);

        handler.consume_actions();
        let snap = handler.snapshot();
        assert!(!snap.jump);
        assert!(!snap.fire);
        assert_eq!(snap.switch, None);
    }

    #[test]
    fn held_state_persists_across_consumption() {
        let mut handler = InputHandler::new();
        handler.apply(InputEvent::Move { x: 0.0, y: 1.0 });
        handler.apply(InputEvent::Sprint { held: true });
        handler.apply(InputEvent::Crouch { held: true });
        handler.consume_actions();

        let snap = handler.snapshot();
        assert!(snap.has_movement());
        assert!(snap.sprint);
        assert!(snap.crouch);

        handler.apply(InputEvent::Sprint { held: false });
        assert!(!handler.snapshot().sprint);
    }

    #[test]
    fn diagonal_is_clamped() {
        let axis = Axis2::new(1.0, 1.0).clamped();
        assert!((axis.length() - 1.0).abs() < 1e-5);
        assert_eq!(Axis2::new(0.5, 0.0).clamped(), Axis2::new(0.5, 0.0));
    }

    #[test]
    fn events_use_tagged_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"select_slot","slot":"melee"}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::SelectSlot {
                slot: WeaponSlot::Melee
            }
        );
    }
}
