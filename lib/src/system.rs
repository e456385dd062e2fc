//! Solar system state: recompute and caching.

use std::f64::consts;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::trace;

use crate::{
    bodies::Body,
    clock::SimulationClock,
    observe::{Change, ChangeEvent, Field, ObserverId, Observers},
};

/// Derived state of one body at a given day count.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Position on the orbit plane (z is always 0).
    pub position: Vector3<f64>,
    /// Self-rotation angle in degrees. Unbounded, not wrapped to
    /// [0, 360); callers normalize if they need to.
    pub rotation_deg: f64,
}

/// Compute a body's state at `days`.
///
/// Pure: equal inputs give bit-identical outputs, so the animation can
/// be tested without ever running a ticker.
pub fn state_at(body: Body, days: f64) -> BodyState {
    let angle = consts::TAU * days / body.orbital_period_days();
    let r = body.orbit_radius();
    BodyState {
        position: Vector3::new(r * libm::cos(angle), r * libm::sin(angle), 0.0),
        rotation_deg: 360.0 * days / body.rotation_period_days(),
    }
}

/// All cached states at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub days: f64,
    pub states: Vec<(Body, BodyState)>,
}

/// The animated system: clock, cached per-body state, observers.
///
/// Cached states are only ever replaced wholesale from [`state_at`];
/// the cache exists so observers can read the previous tick's values
/// without recomputation, not as independent truth.
pub struct SolarSystem {
    clock: SimulationClock,
    states: [BodyState; Body::ALL.len()],
    observers: Observers,
}

impl Default for SolarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SolarSystem {
    pub fn new() -> Self {
        Self::with_clock(SimulationClock::default())
    }

    pub fn with_clock(clock: SimulationClock) -> Self {
        let days = clock.days();
        Self {
            clock,
            states: Body::ALL.map(|body| state_at(body, days)),
            observers: Observers::default(),
        }
    }

    pub fn days(&self) -> f64 {
        self.clock.days()
    }

    pub fn rate(&self) -> f64 {
        self.clock.rate()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn is_reversed(&self) -> bool {
        self.clock.is_reversed()
    }

    /// Cached state from the most recent recompute.
    pub fn body_state(&self, body: Body) -> BodyState {
        self.states[body_index(body)]
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            days: self.clock.days(),
            states: Body::ALL
                .iter()
                .map(|&body| (body, self.body_state(body)))
                .collect(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Advance the clock by a real-time interval and recompute every
    /// body. Emits one event listing the changed fields; a paused
    /// clock (or zero effective elapsed) emits nothing.
    pub fn advance(&mut self, elapsed: Duration) {
        let before = self.clock.days();
        let days = self.clock.advance(elapsed);
        if days == before {
            return;
        }
        trace!(days, "recomputing body states");

        let mut changes = vec![Change::Clock(Field::Days)];
        for (idx, body) in Body::ALL.into_iter().enumerate() {
            let state = state_at(body, days);
            if state.position != self.states[idx].position {
                changes.push(Change::Body(body, Field::Position));
            }
            if state.rotation_deg != self.states[idx].rotation_deg {
                changes.push(Change::Body(body, Field::Rotation));
            }
            self.states[idx] = state;
        }
        self.emit(changes);
    }

    /// Takes effect on the next advance; no retroactive recompute.
    pub fn set_rate(&mut self, rate: f64) {
        if self.clock.rate() != rate {
            self.clock.set_rate(rate);
            self.emit(vec![Change::Clock(Field::Rate)]);
        }
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        if self.clock.is_reversed() != reversed {
            self.clock.set_reversed(reversed);
            self.emit(vec![Change::Clock(Field::Reversed)]);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.clock.is_paused() != paused {
            self.clock.set_paused(paused);
            self.emit(vec![Change::Clock(Field::Paused)]);
        }
    }

    fn emit(&mut self, changes: Vec<Change>) {
        let event = ChangeEvent {
            days: self.clock.days(),
            changes,
        };
        self.observers.emit(&event);
    }
}

fn body_index(body: Body) -> usize {
    // Body::ALL is in declaration order, matching the discriminants.
    body as usize
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn state_at_is_pure() {
        for body in Body::ALL {
            let a = state_at(body, 123.456);
            let b = state_at(body, 123.456);
            assert_eq!(a.position, b.position);
            assert_eq!(a.rotation_deg, b.rotation_deg);
        }
    }

    #[test]
    fn day_zero_puts_bodies_on_the_x_axis() {
        for body in Body::ALL {
            let state = state_at(body, 0.0);
            assert_eq!(state.position.x, body.orbit_radius());
            assert_eq!(state.position.y, 0.0);
            assert_eq!(state.position.z, 0.0);
            assert_eq!(state.rotation_deg, 0.0);
        }
    }

    #[test]
    fn one_orbital_period_closes_the_loop() {
        for body in Body::ALL {
            let start = state_at(body, 0.0);
            let lapped = state_at(body, body.orbital_period_days());
            assert!((lapped.position - start.position).norm() < 1e-9);
        }
    }

    #[test]
    fn rotation_is_linear_in_days() {
        let one = state_at(Body::Mercury, 10.0).rotation_deg;
        let two = state_at(Body::Mercury, 20.0).rotation_deg;
        assert!((two - 2.0 * one).abs() < 1e-12);
        // Unbounded past a full turn: Jupiter spins twice a day.
        assert_eq!(state_at(Body::Jupiter, 1.0).rotation_deg, 720.0);
    }

    #[test]
    fn earth_at_half_period_sits_opposite() {
        let state = state_at(Body::Earth, 365.25 / 2.0);
        assert!((state.position.x + 80.0).abs() < 1e-9);
        assert!(state.position.y.abs() < 1e-9);
    }

    #[test]
    fn advance_emits_ordered_changes() {
        let mut system = SolarSystem::new();
        let events: Arc<Mutex<Vec<ChangeEvent>>> = Arc::default();
        let sink = events.clone();
        system.subscribe(move |event| sink.lock().push(event.clone()));

        system.advance(Duration::seconds(1));
        let events = events.lock();
        assert_eq!(events.len(), 1);
        // The Sun never moves off the origin, so its only change is
        // rotation; every planet changes both fields.
        let expected: Vec<Change> = std::iter::once(Change::Clock(Field::Days))
            .chain(Body::ALL.into_iter().flat_map(|body| {
                let position = (body != Body::Sun)
                    .then_some(Change::Body(body, Field::Position));
                position
                    .into_iter()
                    .chain(std::iter::once(Change::Body(body, Field::Rotation)))
            }))
            .collect();
        assert_eq!(events[0].changes, expected);
        assert_eq!(events[0].days, 2.0);
    }

    #[test]
    fn unchanged_setters_stay_silent() {
        let mut system = SolarSystem::new();
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        system.subscribe(move |_| *sink.lock() += 1);

        system.set_rate(system.rate());
        system.set_reversed(false);
        system.set_paused(false);
        assert_eq!(*count.lock(), 0);

        system.set_rate(10.0);
        system.set_reversed(true);
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn paused_advance_changes_nothing() {
        let mut system = SolarSystem::new();
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        system.subscribe(move |_| *sink.lock() += 1);

        let before = system.snapshot();
        system.set_paused(true);
        system.advance(Duration::hours(6));
        assert_eq!(system.snapshot().days, before.days);
        assert_eq!(system.snapshot().states, before.states);
        // Only the pause flip itself notified.
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn snapshot_matches_recompute() {
        let mut system = SolarSystem::new();
        system.advance(Duration::seconds(42));
        let days = system.days();
        for (body, state) in system.snapshot().states {
            assert_eq!(state, state_at(body, days));
        }
    }
}
