//! Split-flap clock runtime
//!
//! Host-side plumbing around `splitflap_core`:
//!
//! - **StateTable**: the host's entity states, with per-key subscriptions
//! - **Scheduler**: background event loop with a start/stop lifecycle that
//!   ticks the clock every second, on every push, and when flip steps come
//!   due
//! - **SplitFlapClock**: a configure-once clock bound to a state table,
//!   publishing snapshots to renderers

pub mod card;
pub mod scheduler;
pub mod state_table;

pub use card::SplitFlapClock;
pub use scheduler::{PushHandle, Scheduler, SnapshotCallback, TICK_INTERVAL};
pub use state_table::{StateTable, SubscriptionHandle};
