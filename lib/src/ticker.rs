//! Periodic tick scheduling.
//!
//! The simulation never talks to a timer directly; it is driven through
//! the [`Scheduler`] seam so a UI toolkit's dispatcher, the bundled
//! [`ThreadScheduler`], or a manual test double can all host it.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use parking_lot::Mutex;
use time::Duration;
use tracing::info;

use crate::system::SolarSystem;

/// Nominal delay between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::milliseconds(100);

/// A periodic scheduling primitive: invokes `tick` roughly every
/// `interval` until the returned handle is cancelled.
pub trait Scheduler {
    type Handle: TickHandle;

    fn schedule(&self, interval: Duration, tick: Box<dyn FnMut() + Send>) -> Self::Handle;
}

/// Handle to a live schedule.
pub trait TickHandle {
    /// Stop the schedule. Must not return while a tick is still in
    /// flight, so a stop/start pair can never leave two schedules
    /// advancing the same clock.
    fn cancel(self);
}

/// Production scheduler: one thread sleeping `interval` between ticks.
/// Ticks cannot overlap or re-enter.
#[derive(Default)]
pub struct ThreadScheduler;

pub struct ThreadHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadHandle {
    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl TickHandle for ThreadHandle {
    fn cancel(mut self) {
        self.shutdown();
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Scheduler for ThreadScheduler {
    type Handle = ThreadHandle;

    fn schedule(&self, interval: Duration, mut tick: Box<dyn FnMut() + Send>) -> ThreadHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let sleep = std::time::Duration::from_secs_f64(interval.as_seconds_f64().max(0.0));
        let thread = thread::spawn(move || {
            while !flag.load(Ordering::Acquire) {
                thread::sleep(sleep);
                // Re-check after sleeping: a cancel that landed while
                // we slept must not buy one more tick.
                if flag.load(Ordering::Acquire) {
                    break;
                }
                tick();
            }
        });
        ThreadHandle {
            stop,
            thread: Some(thread),
        }
    }
}

/// Drives a shared [`SolarSystem`] from a [`Scheduler`].
///
/// Each tick advances the simulation by the *measured* wall-clock delta
/// since the previous tick, not the nominal interval, so jitter and
/// slow ticks do not distort simulated time.
pub struct Ticker<S: Scheduler = ThreadScheduler> {
    scheduler: S,
    interval: Duration,
    system: Arc<Mutex<SolarSystem>>,
    handle: Option<S::Handle>,
}

impl Ticker<ThreadScheduler> {
    pub fn new(system: Arc<Mutex<SolarSystem>>) -> Self {
        Self::with_scheduler(ThreadScheduler, DEFAULT_TICK_INTERVAL, system)
    }
}

impl<S: Scheduler> Ticker<S> {
    pub fn with_scheduler(
        scheduler: S,
        interval: Duration,
        system: Arc<Mutex<SolarSystem>>,
    ) -> Self {
        Self {
            scheduler,
            interval,
            system,
            handle: None,
        }
    }

    pub fn system(&self) -> &Arc<Mutex<SolarSystem>> {
        &self.system
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Begin ticking. Any prior schedule is cancelled first, so a
    /// double start can never leave two schedules advancing `days`.
    pub fn start(&mut self) {
        self.stop();
        info!(
            interval_ms = self.interval.whole_milliseconds() as i64,
            "starting ticker"
        );
        let system = self.system.clone();
        let mut last_tick = Instant::now();
        let tick = Box::new(move || {
            let now = Instant::now();
            let elapsed = now - last_tick;
            last_tick = now;
            system
                .lock()
                .advance(Duration::seconds_f64(elapsed.as_secs_f64()));
        });
        self.handle = Some(self.scheduler.schedule(self.interval, tick));
    }

    /// Halt ticking; no tick callback fires after this returns.
    /// Idempotent when already stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!("stopping ticker");
            handle.cancel();
        }
    }

    /// `true` pauses the clock and stops the schedule; `false` resumes
    /// with a fresh wall-clock reference, so time spent paused is never
    /// counted.
    pub fn set_pause(&mut self, pause: bool) {
        self.system.lock().set_paused(pause);
        if pause {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn pause(&mut self) {
        self.set_pause(true);
    }

    pub fn resume(&mut self) {
        self.set_pause(false);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    type SharedTick = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

    /// Test double: captures the scheduled callback so tests fire
    /// ticks by hand, without threads or timers.
    #[derive(Default)]
    struct ManualScheduler {
        slot: SharedTick,
        live: Arc<AtomicUsize>,
    }

    struct ManualHandle {
        slot: SharedTick,
        live: Arc<AtomicUsize>,
    }

    impl TickHandle for ManualHandle {
        fn cancel(self) {
            *self.slot.lock() = None;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = ManualHandle;

        fn schedule(&self, _interval: Duration, tick: Box<dyn FnMut() + Send>) -> ManualHandle {
            *self.slot.lock() = Some(tick);
            self.live.fetch_add(1, Ordering::SeqCst);
            ManualHandle {
                slot: self.slot.clone(),
                live: self.live.clone(),
            }
        }
    }

    fn fire(slot: &SharedTick) {
        if let Some(tick) = slot.lock().as_mut() {
            tick();
        }
    }

    fn manual_ticker() -> (Ticker<ManualScheduler>, SharedTick, Arc<AtomicUsize>) {
        let scheduler = ManualScheduler::default();
        let slot = scheduler.slot.clone();
        let live = scheduler.live.clone();
        let system = Arc::new(Mutex::new(SolarSystem::new()));
        let ticker = Ticker::with_scheduler(scheduler, DEFAULT_TICK_INTERVAL, system);
        (ticker, slot, live)
    }

    #[test]
    fn ticks_advance_days() {
        let (mut ticker, slot, _) = manual_ticker();
        ticker.start();
        assert!(ticker.is_running());
        thread::sleep(std::time::Duration::from_millis(5));
        fire(&slot);
        let after_one = ticker.system().lock().days();
        assert!(after_one > 0.0);
        fire(&slot);
        assert!(ticker.system().lock().days() >= after_one);
    }

    #[test]
    fn double_start_leaves_one_schedule() {
        let (mut ticker, _, live) = manual_ticker();
        ticker.start();
        ticker.start();
        assert_eq!(live.load(Ordering::SeqCst), 1);
        ticker.stop();
        ticker.stop();
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(!ticker.is_running());
    }

    #[test]
    fn stop_clears_the_callback() {
        let (mut ticker, slot, _) = manual_ticker();
        ticker.start();
        ticker.stop();
        assert!(slot.lock().is_none());
        let days = ticker.system().lock().days();
        fire(&slot);
        assert_eq!(ticker.system().lock().days(), days);
    }

    #[test]
    fn paused_interval_is_never_counted() {
        let (mut ticker, slot, _) = manual_ticker();
        ticker.start();
        ticker.set_pause(true);
        let paused_at = ticker.system().lock().days();
        assert!(ticker.system().lock().is_paused());

        // Real time passing while paused must not reach the clock.
        thread::sleep(std::time::Duration::from_millis(200));
        fire(&slot);
        assert_eq!(ticker.system().lock().days(), paused_at);

        // Resume re-bases on the current wall clock; at 2 days/s the
        // 200 ms pause would have added 0.4 days had it been counted.
        ticker.set_pause(false);
        fire(&slot);
        let resumed = ticker.system().lock().days();
        assert!(resumed >= paused_at);
        assert!(resumed - paused_at < 0.4);
    }

    #[test]
    fn thread_scheduler_stops_after_cancel() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let handle = ThreadScheduler.schedule(
            Duration::milliseconds(5),
            Box::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        thread::sleep(std::time::Duration::from_millis(60));
        handle.cancel();
        let at_cancel = count.load(Ordering::SeqCst);
        assert!(at_cancel > 0);
        thread::sleep(std::time::Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), at_cancel);
    }
}
