//! Split-flap clock card
//!
//! Host-facing wrapper tying a clock to the host's state table: it is
//! configured once, watches its entity, and hands snapshots to whatever
//! renders it.
//!
//! # Example
//!
//! ```rust
//! use splitflap_core::ClockConfig;
//! use splitflap_runtime::{SplitFlapClock, StateTable};
//!
//! let states = StateTable::new();
//! let mut card = SplitFlapClock::new(states.clone());
//!
//! card.subscribe(|snapshot| println!("{}", snapshot.text()));
//! card.set_config(ClockConfig::for_entity("sensor.time")).unwrap();
//!
//! // Host state changes reach the clock immediately
//! states.set("sensor.time", "21:30");
//!
//! card.shutdown();
//! ```

use std::time::Duration;

use splitflap_core::{ClockConfig, ClockController, ClockSnapshot, Result};

use crate::scheduler::{Scheduler, SnapshotCallback, TICK_INTERVAL};
use crate::state_table::{StateTable, SubscriptionHandle};

struct Configured {
    config: ClockConfig,
    scheduler: Scheduler,
    subscription: Option<SubscriptionHandle>,
}

/// A clock bound to a host state table
pub struct SplitFlapClock {
    states: StateTable,
    interval: Duration,
    subscribers: Vec<SnapshotCallback>,
    configured: Option<Configured>,
}

impl SplitFlapClock {
    pub fn new(states: StateTable) -> Self {
        Self {
            states,
            interval: TICK_INTERVAL,
            subscribers: Vec::new(),
            configured: None,
        }
    }

    /// Override the periodic tick cadence; must be set before configuring
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Build and start the clock
    ///
    /// Only the first call has an effect; the configuration is fixed for
    /// the lifetime of the clock and later calls are ignored.
    pub fn set_config(&mut self, config: ClockConfig) -> Result<()> {
        if self.configured.is_some() {
            tracing::debug!("clock already configured, ignoring new config");
            return Ok(());
        }

        let controller = ClockController::from_config(&config)?;
        let mut scheduler = Scheduler::new(controller, self.states.clone(), config.entity.clone())
            .with_interval(self.interval);

        for callback in &self.subscribers {
            let callback = SnapshotCallback::clone(callback);
            scheduler.subscribe(move |snapshot| callback(snapshot));
        }

        let subscription = if config.has_entity() {
            let pusher = scheduler.push_handle();
            Some(
                self.states
                    .subscribe(&config.entity, move |value| pusher.push(value)),
            )
        } else {
            tracing::warn!("clock has no entity configured, it will never update");
            None
        };

        scheduler.start();
        tracing::info!(
            "split-flap clock started for {:?} (seconds: {}, meridiem: {})",
            config.entity,
            config.show_seconds,
            config.show_meridiem
        );

        self.configured = Some(Configured {
            config,
            scheduler,
            subscription,
        });
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    pub fn config(&self) -> Option<&ClockConfig> {
        self.configured.as_ref().map(|c| &c.config)
    }

    /// Push a time-source value for the configured entity
    ///
    /// Ignored before configuration and when no entity is configured.
    pub fn push(&self, value: impl Into<String>) {
        match &self.configured {
            Some(configured) if configured.config.has_entity() => {
                configured.scheduler.push(value)
            }
            _ => tracing::trace!("clock not ready, push ignored"),
        }
    }

    /// Receive every new snapshot
    ///
    /// Subscriptions made before configuration are attached once the clock
    /// is built.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&ClockSnapshot) + Send + Sync + 'static,
    {
        match &self.configured {
            Some(configured) => configured.scheduler.subscribe(callback),
            None => self.subscribers.push(std::sync::Arc::new(callback)),
        }
    }

    /// Latest snapshot, once configured
    pub fn snapshot(&self) -> Option<ClockSnapshot> {
        self.configured.as_ref().map(|c| c.scheduler.snapshot())
    }

    pub fn is_running(&self) -> bool {
        self.configured
            .as_ref()
            .is_some_and(|c| c.scheduler.is_running())
    }

    /// Stop the scheduler and detach from the state table
    pub fn shutdown(&mut self) {
        if let Some(configured) = self.configured.as_mut() {
            if let Some(subscription) = configured.subscription.take() {
                self.states.unsubscribe(&subscription);
            }
            configured.scheduler.stop();
        }
    }
}

impl Drop for SplitFlapClock {
    fn drop(&mut self) {
        self.shutdown();
    }
}
