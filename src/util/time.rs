//! Time utilities for the tick simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Default tick rate
pub const DEFAULT_TPS: u32 = 60; // 60 ticks per second

/// Delta time for a tick rate (in seconds)
pub fn tick_delta(tps: u32) -> f32 {
    1.0 / tps.max(1) as f32
}

/// Wall-clock duration of one tick
pub fn tick_duration(tps: u32) -> Duration {
    Duration::from_micros(1_000_000 / tps.max(1) as u64)
}

/// Monotonic simulation clock.
///
/// Advanced exactly once per tick; every deadline in the simulation is
/// expressed in seconds on this clock, never on the wall clock.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    tick: u64,
    now: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.now += dt.max(0.0) as f64;
    }

    /// Seconds since the clock started
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Ticks elapsed
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_monotonically() {
        let mut clock = SimClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.tick(), 2);
        assert!((clock.now() - 0.75).abs() < 1e-9);

        clock.advance(-1.0);
        assert_eq!(clock.tick(), 3);
        assert!((clock.now() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn tick_delta_guards_zero_rate() {
        assert_eq!(tick_delta(0), 1.0);
        assert_eq!(tick_duration(50), Duration::from_millis(20));
    }
}
