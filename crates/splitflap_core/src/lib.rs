//! Split-flap clock engine
//!
//! Pure state and timing for a split-flap time display:
//!
//! - **Decoding**: `HH:MM` / `HH:MM:SS` strings into display digits, with
//!   12-hour conversion
//! - **Slots**: one per digit position, with base, top and incoming faces
//! - **Flip animation**: a two-step flip per changed slot (75 ms / 250 ms),
//!   last write wins when a slot is retargeted mid-flip
//! - **Controller**: per-position change detection and the AM/PM label
//! - **Snapshots**: read-only views for renderers
//!
//! Nothing here spawns threads or reads the system clock. Hosts drive the
//! controller with explicit instants; see `splitflap_runtime` for a
//! scheduler that does so in the background.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use splitflap_core::{ClockConfig, ClockController, FlipPhase};
//!
//! let config = ClockConfig::for_entity("sensor.time").with_meridiem(true);
//! let mut clock = ClockController::from_config(&config).unwrap();
//!
//! let t0 = Instant::now();
//! clock.tick("13:05", t0).unwrap();
//! assert_eq!(clock.slots()[1].phase(), FlipPhase::Flipping);
//!
//! clock.advance(t0 + Duration::from_millis(250));
//! let snapshot = clock.snapshot();
//! assert_eq!(snapshot.text(), "01:05");
//! assert_eq!(snapshot.meridiem.as_deref(), Some("PM"));
//! ```

pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod flip;
pub mod format;
pub mod slot;
pub mod snapshot;

pub use clock::{ClockController, MeridiemLabel, TickOutcome};
pub use config::{parse_hex_color, ClockConfig, Colors};
pub use decode::{decode, is_time_shaped, DecodedTime, DigitSequence, Meridiem, TimeSample};
pub use error::{ClockError, ConfigError, DecodeError, Result};
pub use flip::{AppliedStep, FlipAnimator, FlipStep, COMMIT_DELAY, PROMOTE_DELAY};
pub use format::{DisplayFormat, FIELD_WIDTH};
pub use slot::{DigitSlot, FlipPhase};
pub use snapshot::{ClockSnapshot, SlotView};
