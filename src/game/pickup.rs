//! Weapons lying in the world
//!
//! A [`WeaponInstance`] is moved, never shared: it lives either in a player's
//! arsenal or in [`WorldWeapons`], and every handoff is a move of ownership.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::math::Vec3;
use crate::ports::{HitTag, PickupProbe};

use super::weapon::WeaponInstance;

/// Pickup tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    /// Maximum probe distance
    pub distance: f32,
    /// Height above the floor at which dropped weapons rest
    pub drop_height: f32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            distance: 3.0,
            drop_height: 0.2,
        }
    }
}

/// A weapon waiting to be picked up
#[derive(Debug, Clone)]
pub struct WorldPickup {
    pub id: Uuid,
    pub weapon: WeaponInstance,
    pub position: Vec3,
    /// Resting rotation in degrees
    pub yaw: f32,
}

/// Every weapon not held by a player
#[derive(Debug)]
pub struct WorldWeapons {
    pickups: HashMap<Uuid, WorldPickup>,
    rng: ChaCha8Rng,
}

impl WorldWeapons {
    pub fn new(seed: u64) -> Self {
        Self {
            pickups: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Level-placed weapon with a fixed rotation
    pub fn place(&mut self, weapon: WeaponInstance, position: Vec3, yaw: f32) -> Uuid {
        let id = Uuid::new_v4();
        self.pickups.insert(
            id,
            WorldPickup {
                id,
                weapon,
                position,
                yaw,
            },
        );
        id
    }

    /// Weapon discarded by a player; lands with a random rotation
    pub fn drop_weapon(&mut self, weapon: WeaponInstance, position: Vec3) -> Uuid {
        let yaw = self.rng.gen_range(0.0..360.0);
        debug!(weapon = %weapon.name(), yaw, "Weapon dropped into world");
        self.place(weapon, position, yaw)
    }

    /// Hand a pickup's weapon over to the caller
    pub fn take(&mut self, id: Uuid) -> Option<WeaponInstance> {
        self.pickups.remove(&id).map(|p| p.weapon)
    }

    pub fn get(&self, id: Uuid) -> Option<&WorldPickup> {
        self.pickups.get(&id)
    }

    /// Find a lying weapon by instance id (pending reloads still complete)
    pub fn find_weapon_mut(&mut self, weapon_id: Uuid) -> Option<&mut WeaponInstance> {
        self.pickups
            .values_mut()
            .map(|p| &mut p.weapon)
            .find(|w| w.id() == weapon_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldPickup> {
        self.pickups.values()
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }
}

/// The pickup the player is looking at this tick, if any
pub fn find_target(
    probe: &dyn PickupProbe,
    world: &WorldWeapons,
    max_distance: f32,
) -> Option<Uuid> {
    let hit = probe.cast_forward(max_distance)?;
    if hit.distance > max_distance {
        return None;
    }
    match hit.tag {
        HitTag::Pickup(id) if world.get(id).is_some() => Some(id),
        _ => None,
    }
}
