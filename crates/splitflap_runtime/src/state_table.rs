//! Host state table
//!
//! A shared key→string map standing in for the dashboard host's entity
//! states. The clock looks up its configured entity here on every periodic
//! tick and subscribes to it so that new values are pushed immediately.
//!
//! # Example
//!
//! ```rust
//! use splitflap_runtime::StateTable;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let states = StateTable::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&seen);
//! let _sub = states.subscribe("sensor.time", move |_value| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! states.set("sensor.time", "08:00");
//! states.set("sensor.date", "2024-01-01");
//!
//! assert_eq!(states.get("sensor.time").as_deref(), Some("08:00"));
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type Subscriber = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct StateTableInner {
    values: RwLock<FxHashMap<String, String>>,
    subscribers: RwLock<FxHashMap<String, Vec<(u64, Subscriber)>>>,
    next_subscription: AtomicU64,
}

/// Cloneable handle to the host's entity states
#[derive(Clone, Default)]
pub struct StateTable {
    inner: Arc<StateTableInner>,
}

/// Identifies one subscription for [`StateTable::unsubscribe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    key: String,
    id: u64,
}

impl SubscriptionHandle {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.values.read().unwrap().get(key).cloned()
    }

    /// Set the state of `key` and notify its subscribers
    pub fn set(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        self.inner
            .values
            .write()
            .unwrap()
            .insert(key.to_string(), value.clone());

        // Callbacks run without the lock held so they may read the table
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .read()
            .unwrap()
            .get(key)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        for callback in subscribers {
            callback(&value);
        }
    }

    /// Remove the state of `key`
    pub fn remove(&self, key: &str) -> Option<String> {
        self.inner.values.write().unwrap().remove(key)
    }

    /// Call `callback` with every new value set for `key`
    pub fn subscribe<F>(&self, key: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .write()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(callback)));

        SubscriptionHandle {
            key: key.to_string(),
            id,
        }
    }

    /// Drop a subscription; returns false if it was already gone
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut subscribers = self.inner.subscribers.write().unwrap();
        let Some(subs) = subscribers.get_mut(&handle.key) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(id, _)| *id != handle.id);
        let removed = subs.len() != before;
        if subs.is_empty() {
            subscribers.remove(&handle.key);
        }
        removed
    }

    /// All keys with a state
    pub fn keys(&self) -> Vec<String> {
        self.inner.values.read().unwrap().keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.values.read().unwrap().contains_key(key)
    }
}
