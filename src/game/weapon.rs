//! Weapon instances - ammo, fire-rate gating, reload

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::arsenal::WeaponSlot;

/// Weapon stats, shared by every instance of a weapon kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Display name, unique within a catalog
    pub name: String,
    /// Slot the weapon occupies
    pub slot: WeaponSlot,
    /// Magazine size
    pub max_ammo: u32,
    /// Minimum time between two successful shots (seconds)
    pub fire_interval: f32,
    /// Reload duration (seconds)
    pub reload_duration: f32,
    /// Melee weapons attack without spending ammo
    #[serde(default = "default_true")]
    pub consumes_ammo: bool,
    #[serde(default)]
    pub fire_sound: Option<String>,
    #[serde(default)]
    pub reload_sound: Option<String>,
}

fn default_true() -> bool {
    true
}

impl WeaponStats {
    pub fn rifle() -> Self {
        Self {
            name: "Rifle".to_string(),
            slot: WeaponSlot::Primary,
            max_ammo: 30,
            fire_interval: 0.1,
            reload_duration: 2.0,
            consumes_ammo: true,
            fire_sound: Some("rifle_fire".to_string()),
            reload_sound: Some("rifle_reload".to_string()),
        }
    }

    pub fn pistol() -> Self {
        Self {
            name: "Pistol".to_string(),
            slot: WeaponSlot::Secondary,
            max_ammo: 12,
            fire_interval: 0.2,
            reload_duration: 1.5,
            consumes_ammo: true,
            fire_sound: Some("pistol_fire".to_string()),
            reload_sound: Some("pistol_reload".to_string()),
        }
    }

    pub fn knife() -> Self {
        Self {
            name: "Knife".to_string(),
            slot: WeaponSlot::Melee,
            max_ammo: 1,
            fire_interval: 0.8,
            reload_duration: 0.0,
            consumes_ammo: false,
            fire_sound: Some("knife_swing".to_string()),
            reload_sound: None,
        }
    }
}

/// Emitted for every successful shot or swing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireEvent {
    pub weapon_id: Uuid,
    pub slot: WeaponSlot,
    pub ammo_left: u32,
}

/// A concrete weapon. Owned by exactly one of a player slot or a world pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponInstance {
    id: Uuid,
    stats: WeaponStats,
    ammo: u32,
    reloading: bool,
    next_fire_at: f64,
}

impl WeaponInstance {
    /// Create a weapon with a full magazine
    pub fn new(stats: WeaponStats) -> Self {
        Self {
            id: Uuid::new_v4(),
            ammo: stats.max_ammo,
            stats,
            reloading: false,
            next_fire_at: 0.0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn slot(&self) -> WeaponSlot {
        self.stats.slot
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn max_ammo(&self) -> u32 {
        self.stats.max_ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    /// Not reloading and the magazine is not full
    pub fn can_reload(&self) -> bool {
        !self.reloading && self.ammo < self.stats.max_ammo
    }

    pub fn can_fire(&self, now: f64) -> bool {
        self.ammo > 0 && !self.reloading && now >= self.next_fire_at
    }

    /// Fire once if ammo, reload state and cooldown allow it
    pub fn try_fire(&mut self, now: f64) -> Option<FireEvent> {
        if !self.can_fire(now) {
            return None;
        }

        if self.stats.consumes_ammo {
            self.ammo -= 1;
        }
        self.next_fire_at = now + self.stats.fire_interval as f64;

        Some(FireEvent {
            weapon_id: self.id,
            slot: self.stats.slot,
            ammo_left: self.ammo,
        })
    }

    /// Begin a reload. Completion is deferred to [`WeaponInstance::finish_reload`].
    pub fn start_reload(&mut self) -> bool {
        if !self.can_reload() {
            return false;
        }
        self.reloading = true;
        true
    }

    /// Complete a pending reload; a no-op when none is pending
    pub fn finish_reload(&mut self) -> bool {
        if !self.reloading {
            return false;
        }
        self.ammo = self.stats.max_ammo;
        self.reloading = false;
        true
    }
}
