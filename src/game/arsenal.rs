//! Weapon slots carried by a player

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::weapon::WeaponInstance;

/// Weapon slot categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSlot {
    /// Rifles, SMGs
    Primary,
    /// Pistols
    Secondary,
    /// Knives, clubs
    Melee,
}

impl Default for WeaponSlot {
    fn default() -> Self {
        Self::Primary
    }
}

impl WeaponSlot {
    pub const ALL: [WeaponSlot; 3] = [Self::Primary, Self::Secondary, Self::Melee];

    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Melee => 2,
        }
    }
}

/// What happens to the previous occupant when a weapon lands in a full slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// The old weapon is discarded
    Destroy,
    /// The old weapon is handed back so the caller can drop it in the world
    ReturnToWorld,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        Self::ReturnToWorld
    }
}

/// The player's weapon slots and the active selection
#[derive(Debug)]
pub struct Arsenal {
    slots: [Option<WeaponInstance>; 3],
    active: WeaponSlot,
    last_switch_at: Option<f64>,
    switch_cooldown: f32,
    policy: ReplacementPolicy,
}

impl Arsenal {
    pub fn new(switch_cooldown: f32, policy: ReplacementPolicy) -> Self {
        Self {
            slots: [None, None, None],
            active: WeaponSlot::Primary,
            last_switch_at: None,
            switch_cooldown,
            policy,
        }
    }

    pub fn active_slot(&self) -> WeaponSlot {
        self.active
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// The equipped weapon, if the active slot holds one
    pub fn current(&self) -> Option<&WeaponInstance> {
        self.slots[self.active.index()].as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut WeaponInstance> {
        self.slots[self.active.index()].as_mut()
    }

    pub fn get(&self, slot: WeaponSlot) -> Option<&WeaponInstance> {
        self.slots[slot.index()].as_ref()
    }

    pub fn is_occupied(&self, slot: WeaponSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Look a weapon up by instance id in any slot
    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut WeaponInstance> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|weapon| weapon.id() == id)
    }

    pub fn occupied_slots(&self) -> Vec<WeaponSlot> {
        WeaponSlot::ALL
            .into_iter()
            .filter(|slot| self.is_occupied(*slot))
            .collect()
    }

    /// Put a weapon into its slot.
    ///
    /// Returns the previous occupant under [`ReplacementPolicy::ReturnToWorld`].
    /// The new weapon is equipped when nothing is equipped, or when it goes to
    /// the primary slot. Moving off another held weapon is a switch: it is
    /// refused inside the cooldown window and restarts the cooldown.
    pub fn add_weapon(&mut self, weapon: WeaponInstance, now: f64) -> Option<WeaponInstance> {
        let slot = weapon.slot();
        let nothing_equipped = self.current().is_none();
        info!(weapon = %weapon.name(), slot = ?slot, "Weapon added");

        let previous = self.slots[slot.index()].replace(weapon);

        if nothing_equipped {
            self.active = slot;
        } else if slot == WeaponSlot::Primary && slot != self.active {
            if self.cooling_down(now) {
                debug!(slot = ?slot, "Auto-equip skipped: cooldown");
            } else {
                self.active = slot;
                self.last_switch_at = Some(now);
            }
        }

        match (previous, self.policy) {
            (Some(old), ReplacementPolicy::ReturnToWorld) => Some(old),
            (Some(old), ReplacementPolicy::Destroy) => {
                info!(weapon = %old.name(), "Replaced weapon destroyed");
                None
            }
            (None, _) => None,
        }
    }

    /// Take a weapon out of its slot. If it was equipped, the first
    /// occupied slot becomes active.
    pub fn remove_weapon(&mut self, slot: WeaponSlot) -> Option<WeaponInstance> {
        let removed = self.slots[slot.index()].take();
        if removed.is_some() && slot == self.active {
            if let Some(next) = self.occupied_slots().first().copied() {
                self.active = next;
            }
        }
        removed
    }

    /// Equip an occupied slot. Calls inside the cooldown window are ignored.
    pub fn switch_weapon(&mut self, slot: WeaponSlot, now: f64) -> bool {
        if self.cooling_down(now) {
            debug!(slot = ?slot, "Weapon switch ignored: cooldown");
            return false;
        }

        if !self.is_occupied(slot) {
            debug!(slot = ?slot, "Weapon switch ignored: empty slot");
            return false;
        }

        if slot == self.active {
            return false;
        }

        self.active = slot;
        self.last_switch_at = Some(now);
        true
    }

    fn cooling_down(&self, now: f64) -> bool {
        self.last_switch_at
            .is_some_and(|last| now - last < self.switch_cooldown as f64)
    }

    /// Step through occupied slots in Primary, Secondary, Melee order
    pub fn cycle_weapon(&mut self, delta: i32, now: f64) -> bool {
        let occupied = self.occupied_slots();
        if occupied.is_empty() || delta == 0 {
            return false;
        }

        let target = match occupied.iter().position(|slot| *slot == self.active) {
            Some(pos) => {
                let len = occupied.len() as i32;
                occupied[(pos as i32 + delta).rem_euclid(len) as usize]
            }
            None => occupied[0],
        };
        self.switch_weapon(target, now)
    }
}
