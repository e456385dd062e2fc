//! Change notification for external observers.
//!
//! A rendering layer subscribes here instead of polling. Every mutating
//! call on the system emits at most one [`ChangeEvent`] carrying the set
//! of logical fields whose values actually changed, in a fixed order:
//! clock fields first, then bodies in [`Body::ALL`] order with
//! [`Field::Position`] before [`Field::Rotation`]. Emission is
//! synchronous and completes before the mutating call returns.

use serde::{Deserialize, Serialize};

use crate::bodies::Body;

/// A logical field an observer may care about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Elapsed simulated days (clock).
    Days,
    /// Simulated days per real second (clock).
    Rate,
    /// Time-reversal flag (clock).
    Reversed,
    /// Pause flag (clock).
    Paused,
    /// Orbital position (per body).
    Position,
    /// Self-rotation angle (per body).
    Rotation,
}

/// One changed field together with its source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Change {
    Clock(Field),
    Body(Body, Field),
}

/// The full set of fields changed by one mutating call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Day count after the mutation, so observers need not re-read it.
    pub days: f64,
    pub changes: Vec<Change>,
}

/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverFn = Box<dyn FnMut(&ChangeEvent) + Send>;

/// Registry of subscribed observers.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribers: Vec<(ObserverId, ObserverFn)>,
}

impl Observers {
    pub fn subscribe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the id was already gone.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver an event to every subscriber, in subscription order.
    /// A no-op with zero subscribers.
    pub(crate) fn emit(&mut self, event: &ChangeEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }
}

#[cfg(test)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[test]
fn unsubscribe_stops_delivery() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut observers = Observers::default();
    let seen = counter.clone();
    let id = observers.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let event = ChangeEvent {
        days: 1.0,
        changes: vec![Change::Clock(Field::Days)],
    };
    observers.emit(&event);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    assert!(observers.unsubscribe(id));
    assert!(!observers.unsubscribe(id));
    observers.emit(&event);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn emit_without_subscribers_is_a_noop() {
    let mut observers = Observers::default();
    assert!(observers.is_empty());
    observers.emit(&ChangeEvent {
        days: 0.0,
        changes: vec![],
    });
}
