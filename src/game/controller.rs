//! Per-player controller: one deterministic evaluation per tick
//!
//! Order within a tick:
//! 1. deferred tasks due on the clock (reload completion, end of firing)
//! 2. pickup targeting, pickup and discard
//! 3. weapon switch, then fire/reload
//! 4. locomotion state machine and look angles
//! 5. presentation sinks
//! 6. edge-triggered input is consumed

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ControllerTuning;
use crate::input::{InputHandler, InputSnapshot, SwitchRequest};
use crate::math::Vec3;
use crate::ports::{AmmoSink, AnimationSink, GroundSensor, PickupProbe};
use crate::util::time::SimClock;

use super::arsenal::{Arsenal, ReplacementPolicy, WeaponSlot};
use super::camera::{LookController, ViewAngles};
use super::context::GameContext;
use super::events::ControllerEvent;
use super::locomotion::{CombatFacts, LocomotionMachine, MotionOutput};
use super::pickup::{find_target, PickupTuning};
use super::presentation::{AmmoStatus, AnimTrigger, AnimationFrame};
use super::scheduler::{Scheduler, TaskId};
use super::state::LocomotionState;
use super::weapon::{FireEvent, WeaponInstance};

/// Deferred controller work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerTask {
    FinishReload { weapon_id: Uuid },
    EndFiring,
}

/// Host-side facts for one tick
pub struct Senses<'a> {
    pub ground: &'a dyn GroundSensor,
    pub probe: &'a dyn PickupProbe,
    /// Player feet position
    pub position: Vec3,
}

/// Everything a tick produced
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub time: f64,
    pub motion: MotionOutput,
    pub view: ViewAngles,
    pub active_slot: WeaponSlot,
    pub ammo: Option<AmmoStatus>,
    /// Prompt text while a pickup is targeted
    pub prompt: Option<String>,
    pub events: Vec<ControllerEvent>,
}

/// What the equipped weapon did this tick
enum WeaponAction {
    Idle,
    Fired {
        event: FireEvent,
        weapon: String,
        sound: Option<String>,
    },
    ReloadStarted {
        weapon_id: Uuid,
        weapon: String,
        slot: WeaponSlot,
        duration: f32,
        sound: Option<String>,
    },
}

impl WeaponAction {
    fn reload_started(weapon: &WeaponInstance) -> Self {
        Self::ReloadStarted {
            weapon_id: weapon.id(),
            weapon: weapon.name().to_string(),
            slot: weapon.slot(),
            duration: weapon.stats().reload_duration,
            sound: weapon.stats().reload_sound.clone(),
        }
    }
}

pub struct PlayerController {
    input: InputHandler,
    clock: SimClock,
    locomotion: LocomotionMachine,
    look: LookController,
    arsenal: Arsenal,
    scheduler: Scheduler<ControllerTask>,
    pickup: PickupTuning,
    fire_state_duration: f32,
    auto_reload: bool,
    jump_sound: Option<String>,
    pickup_sound: Option<String>,

    firing_task: Option<TaskId>,
    /// Weapon whose reload holds the Reloading state
    reload_lock: Option<Uuid>,
    pickup_target: Option<Uuid>,

    animation: Option<Box<dyn AnimationSink>>,
    ammo_sink: Option<Box<dyn AmmoSink>>,
    last_ammo: Option<Option<AmmoStatus>>,
    warned_missing_animation: bool,
    warned_missing_ammo: bool,
}

impl PlayerController {
    pub fn new(tuning: &ControllerTuning) -> Self {
        Self {
            input: InputHandler::new(),
            clock: SimClock::new(),
            locomotion: LocomotionMachine::new(tuning.movement.clone()),
            look: LookController::new(tuning.look.clone()),
            arsenal: Arsenal::new(
                tuning.weapons.switch_cooldown,
                tuning.weapons.replacement_policy,
            ),
            scheduler: Scheduler::new(),
            pickup: tuning.pickup.clone(),
            fire_state_duration: tuning.weapons.fire_state_duration,
            auto_reload: tuning.weapons.auto_reload,
            jump_sound: tuning.audio.jump_sound.clone(),
            pickup_sound: tuning.audio.pickup_sound.clone(),
            firing_task: None,
            reload_lock: None,
            pickup_target: None,
            animation: None,
            ammo_sink: None,
            last_ammo: None,
            warned_missing_animation: false,
            warned_missing_ammo: false,
        }
    }

    pub fn with_animation_sink(mut self, sink: Box<dyn AnimationSink>) -> Self {
        self.animation = Some(sink);
        self
    }

    pub fn with_ammo_sink(mut self, sink: Box<dyn AmmoSink>) -> Self {
        self.ammo_sink = Some(sink);
        self
    }

    pub fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    pub fn state(&self) -> LocomotionState {
        self.locomotion.state()
    }

    pub fn arsenal(&self) -> &Arsenal {
        &self.arsenal
    }

    pub fn view(&self) -> ViewAngles {
        self.look.angles()
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pickup_target(&self) -> Option<Uuid> {
        self.pickup_target
    }

    /// Hand a weapon to the player outside of world pickup (loadout, scripts).
    /// A displaced weapon is returned under `ReturnToWorld`.
    pub fn give_weapon(&mut self, weapon: WeaponInstance) -> Option<WeaponInstance> {
        self.arsenal.add_weapon(weapon, self.clock.now())
    }

    /// Run one tick
    pub fn tick(&mut self, dt: f32, senses: Senses<'_>, ctx: &mut GameContext) -> TickReport {
        self.clock.advance(dt);
        let now = self.clock.now();
        let input = self.input.snapshot().clone();
        let grounded = senses.ground.is_grounded();

        let mut events = Vec::new();
        let mut triggers = Vec::new();
        let mut combat = CombatFacts::default();

        self.run_due_tasks(now, ctx, &mut combat, &mut events);

        self.pickup_target = find_target(senses.probe, &ctx.world, self.pickup.distance);
        if input.pickup {
            self.try_pickup(senses.position, ctx, &mut events, &mut triggers);
        }
        if input.discard {
            self.discard_active(senses.position, ctx, &mut events, &mut triggers);
        }
        if let Some(request) = input.switch {
            self.handle_switch(request, now, &mut events, &mut triggers);
        }
        self.update_weapon(&input, now, ctx, &mut combat, &mut events, &mut triggers);

        let motion = self.locomotion.step(&input, grounded, combat, dt);
        if motion.previous != motion.state {
            debug!(from = ?motion.previous, to = ?motion.state, "State changed");
            events.push(ControllerEvent::StateChanged {
                from: motion.previous,
                to: motion.state,
            });
        }
        if let Some(impulse) = motion.jump_impulse {
            events.push(ControllerEvent::Jumped { impulse });
            triggers.push(AnimTrigger::Jump);
            ctx.play_cue(self.jump_sound.as_deref());
        }

        let view = self.look.update(input.look_axis, dt);

        self.present(&motion, grounded, triggers);
        let ammo = self.ammo_status();
        self.report_ammo(&ammo);

        let prompt = self
            .pickup_target
            .and_then(|id| ctx.world.get(id))
            .map(|p| format!("Pick up {}", p.weapon.name()));

        self.input.consume_actions();

        TickReport {
            tick: self.clock.tick(),
            time: now,
            motion,
            view,
            active_slot: self.arsenal.active_slot(),
            ammo,
            prompt,
            events,
        }
    }

    fn run_due_tasks(
        &mut self,
        now: f64,
        ctx: &mut GameContext,
        combat: &mut CombatFacts,
        events: &mut Vec<ControllerEvent>,
    ) {
        for task in self.scheduler.drain_due(now) {
            match task {
                ControllerTask::FinishReload { weapon_id } => {
                    let finished = match self.arsenal.find_mut(weapon_id) {
                        Some(weapon) => weapon.finish_reload(),
                        None => ctx
                            .world
                            .find_weapon_mut(weapon_id)
                            .map(|weapon| weapon.finish_reload())
                            .unwrap_or(false),
                    };
                    if finished {
                        events.push(ControllerEvent::ReloadFinished { weapon_id });
                    } else {
                        debug!(%weapon_id, "Reload target no longer exists");
                    }
                    if self.reload_lock == Some(weapon_id) {
                        self.reload_lock = None;
                        combat.reload_finished = true;
                    }
                }
                ControllerTask::EndFiring => {
                    self.firing_task = None;
                    combat.firing_expired = true;
                }
            }
        }
    }

    fn try_pickup(
        &mut self,
        position: Vec3,
        ctx: &mut GameContext,
        events: &mut Vec<ControllerEvent>,
        triggers: &mut Vec<AnimTrigger>,
    ) {
        let Some(target) = self.pickup_target.take() else {
            debug!("Pickup ignored: nothing targeted");
            return;
        };
        let Some(weapon) = ctx.world.take(target) else {
            return;
        };

        let name = weapon.name().to_string();
        let slot = weapon.slot();
        let previous = self.arsenal.get(slot).map(|w| w.name().to_string());

        let replaced = self.arsenal.add_weapon(weapon, self.clock.now());
        events.push(ControllerEvent::WeaponPickedUp {
            weapon: name.clone(),
            slot,
        });

        match (replaced, previous) {
            (Some(old), _) => {
                let old_name = old.name().to_string();
                let pickup_id = ctx.world.drop_weapon(old, self.drop_position(position));
                events.push(ControllerEvent::WeaponDropped {
                    weapon: old_name,
                    pickup_id,
                });
            }
            (None, Some(old_name)) if self.arsenal.policy() == ReplacementPolicy::Destroy => {
                events.push(ControllerEvent::WeaponDestroyed { weapon: old_name });
            }
            _ => {}
        }

        if self.arsenal.active_slot() == slot {
            events.push(ControllerEvent::WeaponEquipped { weapon: name, slot });
            triggers.push(AnimTrigger::Equip);
        }
        ctx.play_cue(self.pickup_sound.as_deref());
    }

    fn discard_active(
        &mut self,
        position: Vec3,
        ctx: &mut GameContext,
        events: &mut Vec<ControllerEvent>,
        triggers: &mut Vec<AnimTrigger>,
    ) {
        let slot = self.arsenal.active_slot();
        let Some(weapon) = self.arsenal.remove_weapon(slot) else {
            debug!("Discard ignored: nothing equipped");
            return;
        };

        let name = weapon.name().to_string();
        let pickup_id = ctx.world.drop_weapon(weapon, self.drop_position(position));
        events.push(ControllerEvent::WeaponDropped {
            weapon: name,
            pickup_id,
        });

        if let Some(current) = self.arsenal.current() {
            events.push(ControllerEvent::WeaponEquipped {
                weapon: current.name().to_string(),
                slot: current.slot(),
            });
            triggers.push(AnimTrigger::Equip);
        }
    }

    fn handle_switch(
        &mut self,
        request: SwitchRequest,
        now: f64,
        events: &mut Vec<ControllerEvent>,
        triggers: &mut Vec<AnimTrigger>,
    ) {
        let switched = match request {
            SwitchRequest::Slot { slot } => self.arsenal.switch_weapon(slot, now),
            SwitchRequest::Cycle { delta } => self.arsenal.cycle_weapon(delta, now),
        };
        if !switched {
            return;
        }
        if let Some(current) = self.arsenal.current() {
            events.push(ControllerEvent::WeaponEquipped {
                weapon: current.name().to_string(),
                slot: current.slot(),
            });
            triggers.push(AnimTrigger::Equip);
        }
    }

    fn update_weapon(
        &mut self,
        input: &InputSnapshot,
        now: f64,
        ctx: &mut GameContext,
        combat: &mut CombatFacts,
        events: &mut Vec<ControllerEvent>,
        triggers: &mut Vec<AnimTrigger>,
    ) {
        let auto_reload = self.auto_reload;
        let action = match self.arsenal.current_mut() {
            None => {
                if input.fire || input.reload {
                    debug!("Weapon input ignored: nothing equipped");
                }
                WeaponAction::Idle
            }
            Some(weapon) => {
                let empty = auto_reload && weapon.ammo() == 0;
                if (input.reload || empty) && weapon.start_reload() {
                    WeaponAction::reload_started(weapon)
                } else if input.fire {
                    match weapon.try_fire(now) {
                        Some(event) => WeaponAction::Fired {
                            event,
                            weapon: weapon.name().to_string(),
                            sound: weapon.stats().fire_sound.clone(),
                        },
                        None => {
                            debug!(weapon = %weapon.name(), "Fire ignored");
                            WeaponAction::Idle
                        }
                    }
                } else {
                    WeaponAction::Idle
                }
            }
        };

        match action {
            WeaponAction::Idle => {}
            WeaponAction::Fired {
                event,
                weapon,
                sound,
            } => {
                combat.fired = true;
                if let Some(task) = self.firing_task.take() {
                    self.scheduler.cancel(task);
                }
                self.firing_task = Some(self.scheduler.schedule_after(
                    now,
                    self.fire_state_duration,
                    ControllerTask::EndFiring,
                ));
                events.push(ControllerEvent::Fired {
                    weapon,
                    slot: event.slot,
                    ammo_left: event.ammo_left,
                });
                triggers.push(AnimTrigger::Fire);
                ctx.play_cue(sound.as_deref());
            }
            WeaponAction::ReloadStarted {
                weapon_id,
                weapon,
                slot,
                duration,
                sound,
            } => {
                combat.reload_started = true;
                if let Some(task) = self.firing_task.take() {
                    self.scheduler.cancel(task);
                }
                self.scheduler.schedule_after(
                    now,
                    duration,
                    ControllerTask::FinishReload { weapon_id },
                );
                self.reload_lock = Some(weapon_id);
                events.push(ControllerEvent::ReloadStarted { weapon, slot });
                triggers.push(AnimTrigger::Reload);
                ctx.play_cue(sound.as_deref());
            }
        }
    }

    fn present(&mut self, motion: &MotionOutput, grounded: bool, triggers: Vec<AnimTrigger>) {
        match self.animation.as_mut() {
            Some(sink) => sink.present(&AnimationFrame::from_motion(motion, grounded, triggers)),
            None => {
                if !self.warned_missing_animation {
                    warn!("No animation sink attached, skipping animation output");
                    self.warned_missing_animation = true;
                }
            }
        }
    }

    fn ammo_status(&self) -> Option<AmmoStatus> {
        self.arsenal.current().map(|weapon| AmmoStatus {
            slot: weapon.slot(),
            weapon: weapon.name().to_string(),
            ammo: weapon.ammo(),
            max_ammo: weapon.max_ammo(),
            reloading: weapon.is_reloading(),
        })
    }

    fn report_ammo(&mut self, status: &Option<AmmoStatus>) {
        if self.last_ammo.as_ref() == Some(status) {
            return;
        }
        self.last_ammo = Some(status.clone());

        match self.ammo_sink.as_mut() {
            Some(sink) => sink.ammo_changed(status.as_ref()),
            None => {
                if !self.warned_missing_ammo {
                    warn!("No ammo sink attached, skipping ammo readout");
                    self.warned_missing_ammo = true;
                }
            }
        }
    }

    fn drop_position(&self, feet: Vec3) -> Vec3 {
        Vec3::new(feet.x, self.pickup.drop_height, feet.z)
    }
}
