//! Headless session and its fixed-rate tick loop

use serde::Serialize;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::settings::{JsonVolumeStore, MemoryVolumeStore, VolumeStore};
use crate::audio::{AudioMixer, SoundLibrary};
use crate::config::{Config, ControllerTuning};
use crate::host::{BodyStats, KinematicBody, SceneProbe};
use crate::host::{TracingAmmoSink, TracingAnimationSink, TracingAudioSink};
use crate::input::InputEvent;
use crate::math::Vec3;
use crate::util::time::{tick_delta, tick_duration, unix_millis, Timer};

use super::catalog::WeaponCatalog;
use super::context::GameContext;
use super::controller::{PlayerController, Senses, TickReport};
use super::events::ControllerEvent;
use super::pickup::WorldWeapons;
use super::snapshot::{FrameSnapshot, SnapshotBuilder, SnapshotStats};

/// Spacing between weapons placed at session start
const SPAWN_SPACING: f32 = 1.5;
/// Distance in front of the player where world spawns are laid out
const SPAWN_DISTANCE: f32 = 3.0;

/// Handle for talking to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<InputEvent>,
    pub frame_tx: broadcast::Sender<FrameSnapshot>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<FrameSnapshot> {
        self.frame_tx.subscribe()
    }
}

/// Totals reported when a session ends
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub ticks: u64,
    pub duration_ms: u64,
    pub shots_fired: u32,
    pub reloads: u32,
    pub jumps: u32,
    pub pickups: u32,
    pub drops: u32,
    pub state_changes: u32,
    pub slow_ticks: u32,
    pub snapshots: SnapshotStats,
}

impl SessionStats {
    fn record(&mut self, events: &[ControllerEvent]) {
        for event in events {
            match event {
                ControllerEvent::Fired { .. } => self.shots_fired += 1,
                ControllerEvent::ReloadStarted { .. } => self.reloads += 1,
                ControllerEvent::Jumped { .. } => self.jumps += 1,
                ControllerEvent::WeaponPickedUp { .. } => self.pickups += 1,
                ControllerEvent::WeaponDropped { .. } => self.drops += 1,
                ControllerEvent::StateChanged { .. } => self.state_changes += 1,
                _ => {}
            }
        }
    }
}

/// One player, the weapons around them, and the audio mixer
pub struct Session {
    id: Uuid,
    tick_rate: u32,
    max_ticks: u64,
    controller: PlayerController,
    ctx: GameContext,
    body: KinematicBody,
    camera_height: f32,
    input_rx: mpsc::Receiver<InputEvent>,
    frame_tx: broadcast::Sender<FrameSnapshot>,
    snapshot_builder: SnapshotBuilder,
    stats: SessionStats,
    inputs_closed: bool,
}

impl Session {
    /// Create a session with the tuning's loadout, world spawns and music
    pub fn new(config: &Config, tuning: &ControllerTuning, seed: u64) -> (Self, SessionHandle) {
        let id = Uuid::new_v4();
        let (input_tx, input_rx) = mpsc::channel(256);
        let (frame_tx, _) = broadcast::channel(64);

        let handle = SessionHandle {
            id,
            input_tx,
            frame_tx: frame_tx.clone(),
        };

        let store: Box<dyn VolumeStore> = match &config.volume_settings_path {
            Some(path) => Box::new(JsonVolumeStore::new(path)),
            None => Box::new(MemoryVolumeStore::default()),
        };
        let audio = AudioMixer::new(
            SoundLibrary::new(tuning.audio.sounds.clone()),
            store,
            Box::new(TracingAudioSink::default()),
        );
        let catalog = WeaponCatalog::new(tuning.weapons.catalog.clone());
        let mut ctx = GameContext::new(WorldWeapons::new(seed), audio, catalog);

        let spawn_count = tuning.weapons.world_spawns.len();
        for (i, name) in tuning.weapons.world_spawns.iter().enumerate() {
            if let Some(weapon) = ctx.catalog.spawn(name) {
                let offset = (i as f32 - (spawn_count as f32 - 1.0) / 2.0) * SPAWN_SPACING;
                let position = Vec3::new(offset, tuning.pickup.drop_height, SPAWN_DISTANCE);
                ctx.world.place(weapon, position, 0.0);
            }
        }

        let mut controller = PlayerController::new(tuning)
            .with_animation_sink(Box::new(TracingAnimationSink))
            .with_ammo_sink(Box::new(TracingAmmoSink));
        for name in &tuning.weapons.loadout {
            let Some(weapon) = ctx.catalog.spawn(name) else {
                continue;
            };
            if let Some(displaced) = controller.give_weapon(weapon) {
                let position = Vec3::new(0.0, tuning.pickup.drop_height, 0.0);
                ctx.world.drop_weapon(displaced, position);
            }
        }

        if let Some(track) = &tuning.audio.music {
            ctx.audio.play_music(track);
        }

        let session = Self {
            id,
            tick_rate: config.tick_rate,
            max_ticks: config.max_ticks,
            controller,
            ctx,
            body: KinematicBody::new(Vec3::ZERO, BodyStats::default()),
            camera_height: tuning.movement.camera_height,
            input_rx,
            frame_tx,
            snapshot_builder: SnapshotBuilder::new(config.snapshot_interval),
            stats: SessionStats::default(),
            inputs_closed: false,
        };

        (session, handle)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlayerController {
        &mut self.controller
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Run the fixed-rate tick loop until `max_ticks` (0 = unbounded) or
    /// until every input sender is dropped
    pub async fn run(mut self) -> SessionStats {
        info!(session_id = %self.id, tick_rate = self.tick_rate, "Session started");
        let started_at = unix_millis();
        let budget_micros = tick_duration(self.tick_rate).as_micros() as u64;

        let mut tick_interval = interval(tick_duration(self.tick_rate));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;
            let timer = Timer::new();

            // Drain input queue
            self.process_inputs();

            let report = self.step();
            let finished = self.max_ticks > 0 && self.stats.ticks >= self.max_ticks;
            if finished || self.inputs_closed {
                self.snapshot_builder.force_next();
            }
            if self.snapshot_builder.should_send() {
                self.broadcast(&report);
            }

            let elapsed = timer.elapsed_micros();
            if elapsed > budget_micros {
                self.stats.slow_ticks += 1;
                warn!(session_id = %self.id, tick = report.tick, elapsed_us = elapsed, "Slow tick");
            }

            if finished {
                info!(session_id = %self.id, ticks = self.stats.ticks, "Tick limit reached");
                break;
            }
            if self.inputs_closed {
                info!(session_id = %self.id, "All input senders dropped, ending session");
                break;
            }
        }

        self.stats.duration_ms = unix_millis().saturating_sub(started_at);
        info!(
            session_id = %self.id,
            ticks = self.stats.ticks,
            shots = self.stats.shots_fired,
            pickups = self.stats.pickups,
            snapshots = self.stats.snapshots.total_snapshots,
            "Session ended"
        );
        self.stats
    }

    /// Advance one tick synchronously
    pub fn step(&mut self) -> TickReport {
        let dt = tick_delta(self.tick_rate);
        let eye = self.body.eye(self.camera_height);
        let probe = SceneProbe::capture(&self.ctx.world, eye, self.controller.view());

        let report = self.controller.tick(
            dt,
            Senses {
                ground: &self.body,
                probe: &probe,
                position: self.body.position(),
            },
            &mut self.ctx,
        );

        self.body.integrate(&report.motion, report.view, dt);
        self.camera_height = report.motion.camera_height;
        self.ctx.audio.update(dt);

        self.stats.ticks += 1;
        self.stats.record(&report.events);
        self.snapshot_builder.record(&report.events);
        report
    }

    /// Apply every queued input event
    fn process_inputs(&mut self) {
        loop {
            match self.input_rx.try_recv() {
                Ok(event) => self.controller.input_mut().apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.inputs_closed = true;
                    break;
                }
            }
        }
    }

    fn broadcast(&mut self, report: &TickReport) {
        let frame = self
            .snapshot_builder
            .build(self.id, report, self.body.position(), &self.ctx.world);

        let bytes = match serde_json::to_vec(&frame) {
            Ok(encoded) => encoded.len(),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Failed to encode frame");
                0
            }
        };
        self.stats.snapshots.record(frame.events.len(), bytes);

        // No subscribers is fine
        if self.frame_tx.send(frame).is_err() {
            debug!(session_id = %self.id, "Frame dropped: no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundCategory;
    use crate::game::arsenal::WeaponSlot;
    use crate::game::state::LocomotionState;
    use crate::game::weapon::WeaponStats;

    fn config(max_ticks: u64) -> Config {
        Config {
            tick_rate: 200,
            max_ticks,
            snapshot_interval: 5,
            ..Config::default()
        }
    }

    #[test]
    fn new_session_has_loadout_and_world_spawns() {
        let (session, _handle) = Session::new(&config(10), &ControllerTuning::default(), 7);
        let arsenal = session.controller().arsenal();
        assert_eq!(arsenal.active_slot(), WeaponSlot::Primary);
        assert!(arsenal.is_occupied(WeaponSlot::Melee));
        assert_eq!(session.context().world.len(), 2);
        assert_eq!(
            session.context().audio.playing(SoundCategory::Music),
            Some("theme")
        );
    }

    #[test]
    fn walking_moves_the_body() {
        let (mut session, _handle) = Session::new(&config(0), &ControllerTuning::default(), 1);
        session
            .controller_mut()
            .input_mut()
            .apply(InputEvent::Move { x: 0.0, y: 1.0 });
        for _ in 0..200 {
            session.step();
        }
        // One second forward at walking speed
        assert!((session.position().z - 5.0).abs() < 0.1);
        assert_eq!(session.controller().state(), LocomotionState::Walking);
    }

    #[test]
    fn jump_lands_back_on_the_floor() {
        let (mut session, _handle) = Session::new(&config(0), &ControllerTuning::default(), 1);
        session.step();
        session.controller_mut().input_mut().apply(InputEvent::Jump);
        let report = session.step();
        assert!(report.motion.jump_impulse.is_some());

        let mut peak: f32 = 0.0;
        for _ in 0..1000 {
            session.step();
            peak = peak.max(session.position().y);
        }
        assert!(peak > 1.0);
        assert_eq!(session.position().y, 0.0);
        assert_ne!(session.controller().state(), LocomotionState::Falling);
        assert_eq!(session.stats().jumps, 1);
    }

    #[test]
    fn look_at_the_pistol_and_pick_it_up() {
        let mut tuning = ControllerTuning::default();
        tuning.weapons.world_spawns = vec!["Pistol".to_string()];
        let (mut session, _handle) = Session::new(&config(0), &tuning, 1);

        // Pitch down until the ray from the eye passes through the pistol
        let angle = (1.6f32 - 0.2).atan2(SPAWN_DISTANCE).to_degrees();
        let look = angle / (100.0 * tick_delta(200));
        let input = session.controller_mut().input_mut();
        input.apply(InputEvent::Look { x: 0.0, y: -look });
        let report = session.step();
        assert!((report.view.pitch - angle).abs() < 0.01);
        session
            .controller_mut()
            .input_mut()
            .apply(InputEvent::Look { x: 0.0, y: 0.0 });

        let report = session.step();
        assert_eq!(report.prompt.as_deref(), Some("Pick up Pistol"));

        session.controller_mut().input_mut().apply(InputEvent::Pickup);
        session.step();
        let arsenal = session.controller().arsenal();
        assert_eq!(
            arsenal.get(WeaponSlot::Secondary).map(|w| w.stats().clone()),
            Some(WeaponStats::pistol())
        );
        // Picked up into an inactive slot, the rifle stays equipped
        assert_eq!(arsenal.active_slot(), WeaponSlot::Primary);
        assert!(session.context().world.is_empty());
        assert_eq!(session.stats().pickups, 1);
    }

    #[tokio::test]
    async fn stops_after_max_ticks() {
        let (session, handle) = Session::new(&config(12), &ControllerTuning::default(), 3);
        let mut frames = handle.subscribe();

        let stats = session.run().await;
        assert_eq!(stats.ticks, 12);

        let mut received = 0;
        while let Ok(frame) = frames.try_recv() {
            assert_eq!(frame.session_id, handle.id);
            received += 1;
        }
        // Every fifth tick, plus the forced final frame
        assert_eq!(received, 3);
        assert_eq!(stats.snapshots.total_snapshots, 3);
    }

    #[test]
    fn ends_when_inputs_close() {
        let (session, handle) = Session::new(&config(0), &ControllerTuning::default(), 3);
        let mut frames = handle.subscribe();

        tokio_test::block_on(handle.input_tx.send(InputEvent::Fire)).unwrap();
        drop(handle);

        // Queued input is still applied on the last tick
        let stats = tokio_test::block_on(session.run());
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.shots_fired, 1);

        let frame = frames.try_recv().unwrap();
        assert!(frame
            .events
            .iter()
            .any(|e| matches!(e, ControllerEvent::Fired { .. })));
    }
}
