//! Frame snapshots broadcast by a running session

use serde::Serialize;
use uuid::Uuid;

use crate::math::Vec3;

use super::arsenal::WeaponSlot;
use super::camera::ViewAngles;
use super::controller::TickReport;
use super::events::ControllerEvent;
use super::pickup::WorldWeapons;
use super::presentation::AmmoStatus;
use super::state::LocomotionState;

/// A weapon lying in the world, as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupSnapshot {
    pub id: Uuid,
    pub weapon: String,
    pub ammo: u32,
    pub position: Vec3,
    pub yaw: f32,
}

/// Player and world state at one tick
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub session_id: Uuid,
    pub tick: u64,
    pub time: f64,
    pub position: Vec3,
    pub view: ViewAngles,
    pub state: LocomotionState,
    pub height: f32,
    pub active_slot: WeaponSlot,
    pub ammo: Option<AmmoStatus>,
    pub prompt: Option<String>,
    pub pickups: Vec<PickupSnapshot>,
    /// Everything that happened since the previous snapshot
    pub events: Vec<ControllerEvent>,
}

/// Decides when to emit snapshots and accumulates events in between
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
    pending_events: Vec<ControllerEvent>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            pending_events: Vec::new(),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Keep a tick's events for the next snapshot
    pub fn record(&mut self, events: &[ControllerEvent]) {
        self.pending_events.extend_from_slice(events);
    }

    pub fn build(
        &mut self,
        session_id: Uuid,
        report: &TickReport,
        position: Vec3,
        world: &WorldWeapons,
    ) -> FrameSnapshot {
        let mut pickups: Vec<PickupSnapshot> = world
            .iter()
            .map(|p| PickupSnapshot {
                id: p.id,
                weapon: p.weapon.name().to_string(),
                ammo: p.weapon.ammo(),
                position: p.position,
                yaw: p.yaw,
            })
            .collect();
        pickups.sort_by_key(|p| p.id);

        FrameSnapshot {
            session_id,
            tick: report.tick,
            time: report.time,
            position,
            view: report.view,
            state: report.motion.state,
            height: report.motion.height,
            active_slot: report.active_slot,
            ammo: report.ammo.clone(),
            prompt: report.prompt.clone(),
            pickups,
            events: std::mem::take(&mut self.pending_events),
        }
    }
}

/// Snapshot volume, for the end-of-session log
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub total_bytes: u64,
    pub avg_events_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, event_count: usize, bytes: usize) {
        self.total_snapshots += 1;
        self.total_bytes += bytes as u64;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_events_per_snapshot =
            self.avg_events_per_snapshot * ((n - 1.0) / n) + (event_count as f32 / n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_every_interval() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, false, true, false, false, true]);

        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn zero_interval_sends_every_tick() {
        let mut builder = SnapshotBuilder::new(0);
        assert!(builder.should_send());
        assert!(builder.should_send());
    }

    #[test]
    fn running_average() {
        let mut stats = SnapshotStats::default();
        stats.record(2, 100);
        stats.record(4, 300);
        assert_eq!(stats.total_snapshots, 2);
        assert_eq!(stats.total_bytes, 400);
        assert!((stats.avg_events_per_snapshot - 3.0).abs() < 1e-6);
    }
}
