//! The simulated-day clock.

use serde::{Deserialize, Serialize};
use time::Duration;

/// Tracks elapsed simulated days and how fast they accrue.
///
/// `days` is the single source of truth for the whole simulation; body
/// positions and rotation angles are recomputed from it on every
/// advance, never accumulated incrementally, so there is no drift.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    days: f64,
    rate: f64,
    reversed: bool,
    paused: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            days: 0.0,
            rate: 2.0,
            reversed: false,
            paused: false,
        }
    }
}

impl SimulationClock {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    /// Elapsed simulated days. Negative under reversed time.
    pub fn days(&self) -> f64 {
        self.days
    }

    /// Simulated days accrued per real second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Takes effect on the next advance; no retroactive recompute.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advance by a real-time interval, returning the new day count.
    ///
    /// A paused clock ignores elapsed time entirely, so however much
    /// wall-clock time passes while paused, `days` stays put.
    pub fn advance(&mut self, elapsed: Duration) -> f64 {
        if self.paused {
            return self.days;
        }
        let sign = if self.reversed { -1.0 } else { 1.0 };
        self.days += elapsed.as_seconds_f64() * self.rate * sign;
        self.days
    }
}

#[test]
fn advance_scales_by_rate() {
    let mut clock = SimulationClock::new(2.0);
    clock.advance(Duration::milliseconds(500));
    assert_eq!(clock.days(), 1.0);
    clock.advance(Duration::seconds(3));
    assert_eq!(clock.days(), 7.0);
}

#[test]
fn reverse_round_trip_returns_home() {
    let mut clock = SimulationClock::new(5.0);
    clock.advance(Duration::seconds(2));
    let before = clock.days();
    clock.set_reversed(true);
    clock.advance(Duration::milliseconds(1250));
    clock.set_reversed(false);
    clock.advance(Duration::milliseconds(1250));
    assert!((clock.days() - before).abs() < 1e-12);
}

#[test]
fn paused_clock_ignores_elapsed_time() {
    let mut clock = SimulationClock::default();
    clock.set_paused(true);
    clock.advance(Duration::hours(10));
    assert_eq!(clock.days(), 0.0);
    clock.set_paused(false);
    clock.advance(Duration::seconds(1));
    assert_eq!(clock.days(), 2.0);
}

#[test]
fn negative_days_are_valid() {
    let mut clock = SimulationClock::default();
    clock.set_reversed(true);
    clock.advance(Duration::seconds(10));
    assert_eq!(clock.days(), -20.0);
}
