//! Locomotion/combat state machine
//!
//! [`transition`] is a pure function of the previous state and this tick's
//! facts. [`LocomotionMachine`] wraps it with the continuous quantities that
//! follow from the state: vertical velocity, horizontal speed, crouch height
//! and the smoothed animation axes.

use serde::{Deserialize, Serialize};

use crate::input::{Axis2, InputSnapshot};

use super::state::{JumpPolicy, LocomotionState, SpeedTable};

/// Movement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub speeds: SpeedTable,
    /// Jump height parameter; impulse is sqrt(2 * jump_force * |gravity|)
    pub jump_force: f32,
    pub gravity: f32,
    /// Horizontal speed multiplier while airborne (0..1)
    pub air_control: f32,
    /// Vertical velocity held while standing on ground
    pub ground_stick_velocity: f32,
    pub stand_height: f32,
    pub crouch_height: f32,
    /// Exponential smoothing rate for height changes (1/s)
    pub crouch_transition_speed: f32,
    /// Camera height while standing
    pub camera_height: f32,
    /// States a grounded player may jump from
    pub jump_states: JumpPolicy,
    /// Smoothing rate for animation move axes (1/s)
    pub animation_smoothing: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            speeds: SpeedTable::default(),
            jump_force: 7.0,
            gravity: -9.81,
            air_control: 0.7,
            ground_stick_velocity: -2.0,
            stand_height: 2.0,
            crouch_height: 1.0,
            crouch_transition_speed: 5.0,
            camera_height: 1.6,
            jump_states: JumpPolicy::default(),
            animation_smoothing: 5.0,
        }
    }
}

impl MovementTuning {
    /// Initial upward velocity of a jump
    pub fn jump_impulse(&self) -> f32 {
        (2.0 * self.jump_force * self.gravity.abs()).sqrt()
    }
}

/// Combat outcomes of this tick that drive priority states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatFacts {
    /// A reload began this tick
    pub reload_started: bool,
    /// The reload that put us in `Reloading` completed this tick
    pub reload_finished: bool,
    /// A shot or swing went off this tick
    pub fired: bool,
    /// The firing window elapsed this tick
    pub firing_expired: bool,
}

/// Result of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: LocomotionState,
    /// State to return to when `Firing` ends
    pub resume: Option<LocomotionState>,
}

/// Locomotion state from movement facts alone
pub fn base_state(input: &InputSnapshot, grounded: bool, vertical_velocity: f32) -> LocomotionState {
    if !grounded {
        return if vertical_velocity > 0.0 {
            LocomotionState::Jumping
        } else {
            LocomotionState::Falling
        };
    }

    if input.crouch {
        LocomotionState::Crouching
    } else if input.aim {
        LocomotionState::Aiming
    } else if input.has_movement() {
        if input.sprint {
            LocomotionState::Running
        } else {
            LocomotionState::Walking
        }
    } else {
        LocomotionState::Idle
    }
}

/// Next state. Total over every combination of inputs.
pub fn transition(
    current: LocomotionState,
    resume: Option<LocomotionState>,
    input: &InputSnapshot,
    grounded: bool,
    vertical_velocity: f32,
    combat: CombatFacts,
) -> Transition {
    let base = base_state(input, grounded, vertical_velocity);

    if combat.reload_started {
        return Transition {
            state: LocomotionState::Reloading,
            resume: None,
        };
    }

    if current == LocomotionState::Reloading && !combat.reload_finished {
        return Transition {
            state: LocomotionState::Reloading,
            resume: None,
        };
    }

    if combat.fired {
        let resume = match current {
            LocomotionState::Firing => resume.or(Some(base)),
            LocomotionState::Reloading => Some(base),
            other => Some(other),
        };
        return Transition {
            state: LocomotionState::Firing,
            resume,
        };
    }

    if current == LocomotionState::Firing {
        if combat.firing_expired {
            // The recorded state only applies if ground contact still matches it
            let state = match resume {
                Some(recorded) if recorded.is_airborne() == base.is_airborne() => recorded,
                _ => base,
            };
            return Transition {
                state,
                resume: None,
            };
        }
        return Transition {
            state: LocomotionState::Firing,
            resume,
        };
    }

    Transition {
        state: base,
        resume: None,
    }
}

/// Continuous output of one locomotion step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionOutput {
    pub previous: LocomotionState,
    pub state: LocomotionState,
    /// Speed applied to the move axis this tick
    pub horizontal_speed: f32,
    /// Planar velocity in the player's local frame (x = strafe, y = forward)
    pub planar_velocity: Axis2,
    pub vertical_velocity: f32,
    /// Set on the tick a jump starts
    pub jump_impulse: Option<f32>,
    pub height: f32,
    pub camera_height: f32,
    /// Smoothed animation move axes
    pub anim_move: Axis2,
}

/// Per-player locomotion state machine
#[derive(Debug)]
pub struct LocomotionMachine {
    tuning: MovementTuning,
    state: LocomotionState,
    resume: Option<LocomotionState>,
    vertical_velocity: f32,
    height: f32,
    camera_height: f32,
    anim_move: Axis2,
}

impl LocomotionMachine {
    pub fn new(tuning: MovementTuning) -> Self {
        Self {
            state: LocomotionState::Idle,
            resume: None,
            vertical_velocity: 0.0,
            height: tuning.stand_height,
            camera_height: tuning.camera_height,
            anim_move: Axis2::ZERO,
            tuning,
        }
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    pub fn resume_state(&self) -> Option<LocomotionState> {
        self.resume
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Advance one tick
    pub fn step(
        &mut self,
        input: &InputSnapshot,
        grounded: bool,
        combat: CombatFacts,
        dt: f32,
    ) -> MotionOutput {
        let previous = self.state;

        // Gravity
        if grounded && self.vertical_velocity < 0.0 {
            self.vertical_velocity = self.tuning.ground_stick_velocity;
        } else {
            self.vertical_velocity += self.tuning.gravity * dt;
        }

        let next = transition(
            self.state,
            self.resume,
            input,
            grounded,
            self.vertical_velocity,
            combat,
        );
        self.state = next.state;
        self.resume = next.resume;

        // Jump
        let mut jump_impulse = None;
        if input.jump && grounded && self.tuning.jump_states.allows(self.state) {
            let impulse = self.tuning.jump_impulse();
            self.vertical_velocity = impulse;
            self.state = LocomotionState::Jumping;
            self.resume = None;
            jump_impulse = Some(impulse);
        }

        // Horizontal
        let mut horizontal_speed = self.tuning.speeds.speed(self.state);
        if !grounded {
            horizontal_speed *= self.tuning.air_control;
        }
        let direction = input.move_axis.clamped();
        let planar_velocity = Axis2::new(direction.x * horizontal_speed, direction.y * horizontal_speed);

        // Crouch height, smoothed over several ticks
        let target_height = if self.state == LocomotionState::Crouching {
            self.tuning.crouch_height
        } else {
            self.tuning.stand_height
        };
        let blend = smoothing_factor(self.tuning.crouch_transition_speed, dt);
        self.height = lerp(self.height, target_height, blend);
        let target_camera = if self.tuning.stand_height > 0.0 {
            self.tuning.camera_height * (target_height / self.tuning.stand_height)
        } else {
            self.tuning.camera_height
        };
        self.camera_height = lerp(self.camera_height, target_camera, blend);

        // Animation axes
        let scale = if input.sprint { 2.0 } else { 1.0 };
        let target_anim = Axis2::new(
            (input.move_axis.x * scale).clamp(-2.0, 2.0),
            (input.move_axis.y * scale).clamp(-2.0, 2.0),
        );
        let anim_blend = smoothing_factor(self.tuning.animation_smoothing, dt);
        self.anim_move = Axis2::new(
            lerp(self.anim_move.x, target_anim.x, anim_blend),
            lerp(self.anim_move.y, target_anim.y, anim_blend),
        );

        MotionOutput {
            previous,
            state: self.state,
            horizontal_speed,
            planar_velocity,
            vertical_velocity: self.vertical_velocity,
            jump_impulse,
            height: self.height,
            camera_height: self.camera_height,
            anim_move: self.anim_move,
        }
    }
}

fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn moving(sprint: bool) -> InputSnapshot {
        InputSnapshot {
            move_axis: Axis2::new(0.0, 1.0),
            sprint,
            ..Default::default()
        }
    }

    #[test]
    fn transition_is_total_and_deterministic() {
        let inputs = [
            InputSnapshot::default(),
            moving(false),
            moving(true),
            InputSnapshot {
                crouch: true,
                aim: true,
                ..moving(true)
            },
        ];
        let flags = [false, true];

        for current in LocomotionState::ALL {
            for input in &inputs {
                for grounded in flags {
                    for vy in [-1.0, 0.0, 1.0] {
                        for bits in 0..16u8 {
                            let combat = CombatFacts {
                                reload_started: bits & 1 != 0,
                                reload_finished: bits & 2 != 0,
                                fired: bits & 4 != 0,
                                firing_expired: bits & 8 != 0,
                            };
                            let a = transition(current, None, input, grounded, vy, combat);
                            let b = transition(current, None, input, grounded, vy, combat);
                            assert_eq!(a, b);
                            assert!(LocomotionState::ALL.contains(&a.state));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn base_state_priorities() {
        let input = InputSnapshot {
            crouch: true,
            ..moving(true)
        };
        assert_eq!(base_state(&input, true, 0.0), LocomotionState::Crouching);
        assert_eq!(base_state(&input, false, 1.0), LocomotionState::Jumping);
        assert_eq!(base_state(&input, false, -0.1), LocomotionState::Falling);
        assert_eq!(base_state(&moving(true), true, 0.0), LocomotionState::Running);
        assert_eq!(base_state(&moving(false), true, 0.0), LocomotionState::Walking);
        assert_eq!(
            base_state(&InputSnapshot::default(), true, 0.0),
            LocomotionState::Idle
        );
        let aiming = InputSnapshot {
            aim: true,
            ..moving(false)
        };
        assert_eq!(base_state(&aiming, true, 0.0), LocomotionState::Aiming);
    }

    #[test]
    fn reload_outranks_fire() {
        let t = transition(
            LocomotionState::Firing,
            Some(LocomotionState::Walking),
            &moving(false),
            true,
            0.0,
            CombatFacts {
                reload_started: true,
                fired: true,
                ..Default::default()
            },
        );
        assert_eq!(t.state, LocomotionState::Reloading);
        assert_eq!(t.resume, None);
    }

    #[test]
    fn reloading_holds_until_finished() {
        let held = transition(
            LocomotionState::Reloading,
            None,
            &moving(true),
            false,
            -3.0,
            CombatFacts::default(),
        );
        assert_eq!(held.state, LocomotionState::Reloading);

        let done = transition(
            LocomotionState::Reloading,
            None,
            &moving(true),
            true,
            0.0,
            CombatFacts {
                reload_finished: true,
                ..Default::default()
            },
        );
        assert_eq!(done.state, LocomotionState::Running);
    }

    #[test]
    fn grounded_idle_jump_applies_impulse() {
        let tuning = MovementTuning::default();
        let expected = (2.0 * tuning.jump_force * tuning.gravity.abs()).sqrt();
        let mut machine = LocomotionMachine::new(tuning);

        let input = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        let out = machine.step(&input, true, CombatFacts::default(), DT);

        assert_eq!(out.previous, LocomotionState::Idle);
        assert_eq!(out.state, LocomotionState::Jumping);
        assert_eq!(out.jump_impulse, Some(expected));
        assert_eq!(out.vertical_velocity, expected);
    }

    #[test]
    fn cannot_jump_mid_air_or_while_firing() {
        let mut machine = LocomotionMachine::new(MovementTuning::default());
        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        let out = machine.step(&jump, false, CombatFacts::default(), DT);
        assert_eq!(out.jump_impulse, None);
        assert_eq!(out.state, LocomotionState::Falling);

        let mut machine = LocomotionMachine::new(MovementTuning::default());
        let fire = CombatFacts {
            fired: true,
            ..Default::default()
        };
        let out = machine.step(&jump, true, fire, DT);
        assert_eq!(out.state, LocomotionState::Firing);
        assert_eq!(out.jump_impulse, None);
    }

    #[test]
    fn firing_reverts_to_pre_fire_state() {
        let mut machine = LocomotionMachine::new(MovementTuning::default());
        let run = moving(true);
        let out = machine.step(&run, true, CombatFacts::default(), DT);
        assert_eq!(out.state, LocomotionState::Running);

        let fired = CombatFacts {
            fired: true,
            ..Default::default()
        };
        assert_eq!(machine.step(&run, true, fired, DT).state, LocomotionState::Firing);
        assert_eq!(machine.resume_state(), Some(LocomotionState::Running));

        // Still inside the firing window; a second shot keeps the recorded state
        let idle = InputSnapshot::default();
        assert_eq!(
            machine.step(&idle, true, CombatFacts::default(), DT).state,
            LocomotionState::Firing
        );
        assert_eq!(machine.step(&idle, true, fired, DT).state, LocomotionState::Firing);
        assert_eq!(machine.resume_state(), Some(LocomotionState::Running));

        let expired = CombatFacts {
            firing_expired: true,
            ..Default::default()
        };
        assert_eq!(
            machine.step(&idle, true, expired, DT).state,
            LocomotionState::Running
        );
        assert_eq!(
            machine.step(&idle, true, CombatFacts::default(), DT).state,
            LocomotionState::Idle
        );
    }

    /// Jump, fire in the air, then land while the firing window is open
    fn fired_mid_air_then_landed() -> LocomotionMachine {
        let mut machine = LocomotionMachine::new(MovementTuning::default());
        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        let idle = InputSnapshot::default();
        let fired = CombatFacts {
            fired: true,
            ..Default::default()
        };

        assert_eq!(
            machine.step(&jump, true, CombatFacts::default(), DT).state,
            LocomotionState::Jumping
        );
        assert_eq!(machine.step(&idle, false, fired, DT).state, LocomotionState::Firing);
        assert_eq!(machine.resume_state(), Some(LocomotionState::Jumping));
        assert_eq!(
            machine.step(&idle, true, CombatFacts::default(), DT).state,
            LocomotionState::Firing
        );
        machine
    }

    #[test]
    fn landed_firing_expiry_resolves_to_grounded_state() {
        let expired = CombatFacts {
            firing_expired: true,
            ..Default::default()
        };

        let mut machine = fired_mid_air_then_landed();
        let out = machine.step(&InputSnapshot::default(), true, expired, DT);
        assert_eq!(out.state, LocomotionState::Idle);
        assert_eq!(out.jump_impulse, None);

        // A jump pressed on the expiry tick is honoured
        let mut machine = fired_mid_air_then_landed();
        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        let out = machine.step(&jump, true, expired, DT);
        assert_eq!(out.state, LocomotionState::Jumping);
        assert!(out.jump_impulse.is_some());

        // The reverse mismatch: fired on the ground, expired in the air
        let t = transition(
            LocomotionState::Firing,
            Some(LocomotionState::Running),
            &moving(true),
            false,
            -1.0,
            expired,
        );
        assert_eq!(t.state, LocomotionState::Falling);
    }

    #[test]
    fn crouch_height_is_smoothed() {
        let tuning = MovementTuning::default();
        let (stand, crouch) = (tuning.stand_height, tuning.crouch_height);
        let mut machine = LocomotionMachine::new(tuning);
        let input = InputSnapshot {
            crouch: true,
            ..Default::default()
        };

        let first = machine.step(&input, true, CombatFacts::default(), DT);
        assert_eq!(first.state, LocomotionState::Crouching);
        assert!(first.height < stand);
        assert!(first.height > crouch);

        let mut height = first.height;
        for _ in 0..600 {
            height = machine.step(&input, true, CombatFacts::default(), DT).height;
        }
        assert!((height - crouch).abs() < 1e-3);
    }

    #[test]
    fn speed_follows_table_and_air_control() {
        let tuning = MovementTuning::default();
        let run_speed = tuning.speeds.running;
        let fall_speed = tuning.speeds.falling * tuning.air_control;
        let mut machine = LocomotionMachine::new(tuning);

        let out = machine.step(&moving(true), true, CombatFacts::default(), DT);
        assert_eq!(out.horizontal_speed, run_speed);
        assert_eq!(out.planar_velocity, Axis2::new(0.0, run_speed));

        let out = machine.step(&moving(true), false, CombatFacts::default(), DT);
        assert_eq!(out.state, LocomotionState::Falling);
        assert!((out.horizontal_speed - fall_speed).abs() < 1e-6);
    }

    #[test]
    fn grounded_velocity_sticks_to_floor() {
        let tuning = MovementTuning::default();
        let stick = tuning.ground_stick_velocity;
        let mut machine = LocomotionMachine::new(tuning);
        let idle = InputSnapshot::default();
        machine.step(&idle, true, CombatFacts::default(), DT);
        let out = machine.step(&idle, true, CombatFacts::default(), DT);
        assert_eq!(out.vertical_velocity, stick);
    }

    #[test]
    fn animation_axes_ease_toward_target() {
        let mut machine = LocomotionMachine::new(MovementTuning::default());
        let out = machine.step(&moving(true), true, CombatFacts::default(), DT);
        assert!(out.anim_move.y > 0.0 && out.anim_move.y < 2.0);
        let mut last = out.anim_move.y;
        for _ in 0..300 {
            last = machine.step(&moving(true), true, CombatFacts::default(), DT).anim_move.y;
        }
        assert!((last - 2.0).abs() < 1e-3);
    }
}
