//! Clock scheduler
//!
//! Runs a [`ClockController`] on a background thread that acts as the
//! clock's only event queue:
//!
//! - every `interval` (1000 ms by default) the latest observed value is
//!   ticked; a table value counts as observed only once it changes, so a
//!   push is not undone by a stale table entry
//! - pushed values are ticked as soon as they arrive
//! - flip steps are applied when they come due
//!
//! All controller mutation happens on that thread. The host thread only
//! reads snapshots, and snapshot subscribers are called from the scheduler
//! thread whenever the visible state changes.
//!
//! ```ignore
//! let mut scheduler = Scheduler::new(controller, states, "sensor.time");
//! scheduler.subscribe(|snapshot| println!("{}", snapshot.text()));
//! scheduler.start();
//! // ...
//! scheduler.stop();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use splitflap_core::{ClockController, ClockSnapshot, TickOutcome};

use crate::state_table::StateTable;

/// Default periodic tick cadence
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Callback invoked with each new snapshot
pub type SnapshotCallback = Arc<dyn Fn(&ClockSnapshot) + Send + Sync>;

enum Message {
    Push(String),
    Stop,
}

/// Cloneable sender for time-source pushes
///
/// Pushes are dropped while the scheduler is not running.
#[derive(Clone)]
pub struct PushHandle {
    sender: Sender<Message>,
    running: Arc<AtomicBool>,
}

impl PushHandle {
    /// Hand a new time-source value to the scheduler
    pub fn push(&self, value: impl Into<String>) {
        if !self.running.load(Ordering::Acquire) {
            tracing::trace!("scheduler not running, push ignored");
            return;
        }
        let _ = self.sender.send(Message::Push(value.into()));
    }
}

/// Owns the background thread driving one clock
pub struct Scheduler {
    clock: Arc<Mutex<ClockController>>,
    states: StateTable,
    entity: String,
    interval: Duration,
    subscribers: Arc<RwLock<Vec<SnapshotCallback>>>,
    latest: Arc<Mutex<ClockSnapshot>>,
    sender: Sender<Message>,
    /// Held here while stopped, owned by the thread while running
    receiver: Option<Receiver<Message>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<Receiver<Message>>>,
}

impl Scheduler {
    /// Scheduler for `clock`, reading `entity` from `states`
    pub fn new(clock: ClockController, states: StateTable, entity: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let latest = clock.snapshot();
        Self {
            clock: Arc::new(Mutex::new(clock)),
            states,
            entity: entity.into(),
            interval: TICK_INTERVAL,
            subscribers: Arc::new(RwLock::new(Vec::new())),
            latest: Arc::new(Mutex::new(latest)),
            sender,
            receiver: Some(receiver),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Override the periodic tick cadence (at least 1 ms)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Register a snapshot callback
    ///
    /// Callbacks run on the scheduler thread and must not block.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&ClockSnapshot) + Send + Sync + 'static,
    {
        self.subscribers.write().unwrap().push(Arc::new(callback));
    }

    /// Handle for pushing time-source values from other threads
    pub fn push_handle(&self) -> PushHandle {
        PushHandle {
            sender: self.sender.clone(),
            running: Arc::clone(&self.running),
        }
    }

    /// Push a time-source value; ignored while stopped
    pub fn push(&self, value: impl Into<String>) {
        self.push_handle().push(value);
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ClockSnapshot {
        self.latest.lock().unwrap().clone()
    }

    /// Run `f` against the controller
    ///
    /// Holds the clock lock, so the scheduler thread waits meanwhile.
    pub fn with_clock<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ClockController) -> R,
    {
        f(&self.clock.lock().unwrap())
    }

    /// Start the background thread
    ///
    /// Ticks once immediately, then every interval.
    pub fn start(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }
        let Some(receiver) = self.receiver.take() else {
            tracing::warn!("scheduler has no message queue, not starting");
            return;
        };

        let event_loop = EventLoop {
            clock: Arc::clone(&self.clock),
            states: self.states.clone(),
            entity: self.entity.clone(),
            interval: self.interval,
            subscribers: Arc::clone(&self.subscribers),
            latest: Arc::clone(&self.latest),
            running: Arc::clone(&self.running),
            receiver,
        };

        tracing::debug!(
            "starting clock scheduler for {:?} every {:?}",
            self.entity,
            self.interval
        );
        self.running.store(true, Ordering::Release);
        self.thread_handle = Some(thread::spawn(move || event_loop.run()));
    }

    /// Stop the background thread and wait for it
    pub fn stop(&mut self) {
        let Some(handle) = self.thread_handle.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        let _ = self.sender.send(Message::Stop);
        match handle.join() {
            Ok(receiver) => {
                // Anything queued after the stop is stale
                while receiver.try_recv().is_ok() {}
                self.receiver = Some(receiver);
            }
            Err(_) => tracing::error!("clock scheduler thread panicked"),
        }
        tracing::debug!("clock scheduler for {:?} stopped", self.entity);
    }

    /// Whether the loop is alive
    ///
    /// Turns false on its own if the loop hit a fatal clock error.
    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some() && self.running.load(Ordering::Acquire)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved onto the scheduler thread
struct EventLoop {
    clock: Arc<Mutex<ClockController>>,
    states: StateTable,
    entity: String,
    interval: Duration,
    subscribers: Arc<RwLock<Vec<SnapshotCallback>>>,
    latest: Arc<Mutex<ClockSnapshot>>,
    running: Arc<AtomicBool>,
    receiver: Receiver<Message>,
}

impl EventLoop {
    fn run(self) -> Receiver<Message> {
        let mut next_tick = Instant::now();
        // Latest value seen from either the table or a push
        let mut observed: Option<String> = None;
        // Table value as of the last periodic read
        let mut last_read: Option<String> = None;

        loop {
            let now = Instant::now();

            if now >= next_tick && !self.entity.is_empty() {
                let current = self.states.get(&self.entity);
                if current != last_read {
                    if current.is_some() {
                        observed = current.clone();
                    }
                    last_read = current;
                }
                match observed.as_deref() {
                    Some(value) => {
                        if !self.tick(value, now) {
                            break;
                        }
                    }
                    None => tracing::trace!("no state for {:?}, tick skipped", self.entity),
                }
            }
            // Missed intervals are skipped rather than replayed
            while next_tick <= now {
                next_tick += self.interval;
            }

            self.advance(now);

            let deadline = self
                .clock
                .lock()
                .unwrap()
                .next_deadline()
                .map_or(next_tick, |due| due.min(next_tick));
            let timeout = deadline.saturating_duration_since(Instant::now());

            match self.receiver.recv_timeout(timeout) {
                Ok(Message::Push(value)) => {
                    let keep_running = self.tick(&value, Instant::now());
                    observed = Some(value);
                    if !keep_running {
                        break;
                    }
                }
                Ok(Message::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        self.running.store(false, Ordering::Release);
        self.receiver
    }

    /// Returns false when the loop must stop
    fn tick(&self, value: &str, now: Instant) -> bool {
        let result = self.clock.lock().unwrap().tick(value, now);
        match result {
            Ok(TickOutcome::Skipped(_)) => true,
            Ok(outcome) => {
                if outcome.changed() {
                    self.publish();
                }
                true
            }
            Err(err) => {
                tracing::error!("clock invariant violated, stopping scheduler: {}", err);
                false
            }
        }
    }

    fn advance(&self, now: Instant) {
        let applied = self.clock.lock().unwrap().advance(now);
        if !applied.is_empty() {
            self.publish();
        }
    }

    fn publish(&self) {
        let snapshot = self.clock.lock().unwrap().snapshot();
        *self.latest.lock().unwrap() = snapshot.clone();

        let subscribers: Vec<SnapshotCallback> =
            self.subscribers.read().unwrap().iter().cloned().collect();
        for callback in subscribers {
            callback(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitflap_core::DisplayFormat;

    fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    fn clock() -> ClockController {
        ClockController::build(DisplayFormat::hh_mm(), false).unwrap()
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let mut scheduler = Scheduler::new(clock(), StateTable::new(), "sensor.time");
        assert!(!scheduler.is_running());

        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());

        // Restartable after a stop
        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[test]
    fn test_initial_tick_reads_state_table() {
        let states = StateTable::new();
        states.set("sensor.time", "09:45");

        let mut scheduler = Scheduler::new(clock(), states, "sensor.time");
        scheduler.start();

        assert!(wait_until(|| {
            let snap = scheduler.snapshot();
            snap.text() == "09:45" && !snap.is_animating()
        }));
        scheduler.stop();
    }

    #[test]
    fn test_push_ticks_immediately() {
        let mut scheduler = Scheduler::new(clock(), StateTable::new(), "sensor.time")
            .with_interval(Duration::from_secs(3600));
        let texts = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&texts);
        scheduler.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.text());
        });

        scheduler.start();
        scheduler.push("12:34");

        assert!(wait_until(|| scheduler.snapshot().text() == "12:34"));
        assert!(wait_until(|| !scheduler.snapshot().is_animating()));
        scheduler.stop();

        let texts = texts.lock().unwrap();
        // Published at flip start (still 00:00) and again once digits moved
        assert_eq!(texts.first().map(String::as_str), Some("00:00"));
        assert_eq!(texts.last().map(String::as_str), Some("12:34"));
    }

    #[test]
    fn test_push_ignored_while_stopped() {
        let mut scheduler = Scheduler::new(clock(), StateTable::new(), "sensor.time")
            .with_interval(Duration::from_secs(3600));

        scheduler.push("11:11");
        scheduler.start();
        thread::sleep(Duration::from_millis(400));

        assert_eq!(scheduler.snapshot().text(), "00:00");
        scheduler.stop();
    }

    #[test]
    fn test_periodic_tick_follows_state_table() {
        let states = StateTable::new();
        let mut scheduler = Scheduler::new(clock(), states.clone(), "sensor.time")
            .with_interval(Duration::from_millis(50));
        scheduler.start();

        // Set without any push: only the periodic tick can pick it up
        states.set("sensor.time", "06:30");
        assert!(wait_until(|| scheduler.snapshot().text() == "06:30"));
        scheduler.stop();
    }

    #[test]
    fn test_push_survives_periodic_tick() {
        let states = StateTable::new();
        states.set("sensor.time", "09:00");
        let mut scheduler = Scheduler::new(clock(), states.clone(), "sensor.time")
            .with_interval(Duration::from_millis(100));
        scheduler.start();
        assert!(wait_until(|| {
            let snap = scheduler.snapshot();
            snap.text() == "09:00" && !snap.is_animating()
        }));

        scheduler.push("12:34");
        assert!(wait_until(|| {
            let snap = scheduler.snapshot();
            snap.text() == "12:34" && !snap.is_animating()
        }));

        // Several periodic ticks with the stale table value still in place
        thread::sleep(Duration::from_millis(500));
        assert_eq!(scheduler.snapshot().text(), "12:34");

        // A fresh table value takes over again
        states.set("sensor.time", "18:45");
        assert!(wait_until(|| scheduler.snapshot().text() == "18:45"));
        scheduler.stop();
    }

    #[test]
    fn test_digit_count_mismatch_stops_loop() {
        let mut controller = clock();
        controller.drop_last_slot();

        let mut scheduler = Scheduler::new(controller, StateTable::new(), "sensor.time")
            .with_interval(Duration::from_secs(3600));
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.push("12:34");
        assert!(wait_until(|| !scheduler.is_running()));
        assert_eq!(scheduler.with_clock(|c| c.displayed()), "000");

        // Stopping a loop that already ended is harmless
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_drop_stops_thread() {
        let running = {
            let mut scheduler = Scheduler::new(clock(), StateTable::new(), "sensor.time");
            scheduler.start();
            Arc::clone(&scheduler.running)
        };
        assert!(!running.load(Ordering::Acquire));
    }
}
