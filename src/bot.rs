//! Seeded input generator that drives the demo session

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::arsenal::WeaponSlot;
use crate::input::InputEvent;

/// Ticks between movement decisions
const DECISION_TICKS: u64 = 45;

/// Plays like a restless player: wanders, sprints, shoots, jumps and
/// grabs whatever is in front of it
pub struct DemoBot {
    rng: ChaCha8Rng,
    tick: u64,
}

impl DemoBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        }
    }

    /// Events for the next tick
    pub fn next_events(&mut self) -> Vec<InputEvent> {
        self.tick += 1;
        let mut events = Vec::new();

        if self.tick % DECISION_TICKS == 1 {
            let heading = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let moving = self.rng.gen_bool(0.7);
            let (x, y) = if moving {
                (heading.sin(), heading.cos())
            } else {
                (0.0, 0.0)
            };
            events.push(InputEvent::Move { x, y });
            events.push(InputEvent::Sprint {
                held: moving && self.rng.gen_bool(0.3),
            });
            events.push(InputEvent::Crouch {
                held: !moving && self.rng.gen_bool(0.2),
            });
            events.push(InputEvent::Look {
                x: self.rng.gen_range(-0.5..0.5),
                y: self.rng.gen_range(-0.2..0.2),
            });
        }

        if self.rng.gen_bool(0.05) {
            events.push(InputEvent::Fire);
        }
        if self.rng.gen_bool(0.004) {
            events.push(InputEvent::Reload);
        }
        if self.rng.gen_bool(0.006) {
            events.push(InputEvent::Jump);
        }
        if self.rng.gen_bool(0.01) {
            events.push(InputEvent::Pickup);
        }
        if self.rng.gen_bool(0.003) {
            let slot = WeaponSlot::ALL[self.rng.gen_range(0..WeaponSlot::ALL.len())];
            events.push(InputEvent::SelectSlot { slot });
        }

        events
    }
}
