//! Clock controller
//!
//! Owns the digit slots and the meridiem label. Each [`tick`] decodes a
//! raw time-source value, compares it slot by slot against what the clock
//! is showing and starts a flip only where the digit differs.
//!
//! The controller never reads a clock itself: callers pass `now` in, which
//! keeps every timing path deterministic under test.
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use splitflap_core::{ClockController, DisplayFormat};
//!
//! let mut clock = ClockController::build(DisplayFormat::hh_mm(), false).unwrap();
//! let t0 = Instant::now();
//!
//! clock.tick("09:45", t0).unwrap();
//! clock.advance(t0 + Duration::from_millis(250));
//! assert_eq!(clock.snapshot().text(), "09:45");
//! ```
//!
//! [`tick`]: ClockController::tick

use std::time::Instant;

use smallvec::SmallVec;

use crate::config::ClockConfig;
use crate::decode::{decode, Meridiem};
use crate::error::{ClockError, DecodeError, Result};
use crate::flip::{AppliedStep, FlipAnimator};
use crate::format::DisplayFormat;
use crate::slot::DigitSlot;
use crate::snapshot::{ClockSnapshot, SlotView};

/// AM/PM label state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeridiemLabel {
    current: Option<Meridiem>,
}

impl MeridiemLabel {
    pub fn meridiem(&self) -> Option<Meridiem> {
        self.current
    }

    /// Label text, empty until an hour has been decoded
    pub fn text(&self) -> &'static str {
        self.current.map(Meridiem::as_str).unwrap_or("")
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Value was rejected; nothing changed
    Skipped(DecodeError),
    /// Value was applied
    Applied {
        /// Slots that started a flip
        flipped: SmallVec<[usize; 6]>,
        meridiem_changed: bool,
    },
}

impl TickOutcome {
    /// Whether the tick changed anything visible
    pub fn changed(&self) -> bool {
        match self {
            TickOutcome::Skipped(_) => false,
            TickOutcome::Applied {
                flipped,
                meridiem_changed,
            } => !flipped.is_empty() || *meridiem_changed,
        }
    }
}

/// Digit slots, meridiem label and their animator
#[derive(Debug)]
pub struct ClockController {
    format: DisplayFormat,
    slots: Vec<DigitSlot>,
    meridiem: Option<MeridiemLabel>,
    animator: FlipAnimator,
}

impl ClockController {
    /// Build a clock showing `format`, in 12-hour mode with a meridiem
    /// label when `show_meridiem` is set
    ///
    /// Every slot starts at `'0'`, idle.
    pub fn build(format: DisplayFormat, show_meridiem: bool) -> Result<Self> {
        let format = DisplayFormat::from_fields(format.fields())?;
        let slots = (0..format.digit_count()).map(DigitSlot::new).collect();

        tracing::debug!(
            "building clock: fields {:?}, meridiem {}",
            format.fields(),
            show_meridiem
        );

        Ok(Self {
            format,
            slots,
            meridiem: show_meridiem.then(MeridiemLabel::default),
            animator: FlipAnimator::new(),
        })
    }

    /// Build the clock described by a card config
    pub fn from_config(config: &ClockConfig) -> Result<Self> {
        Self::build(config.display_format(), config.show_meridiem)
    }

    pub fn format(&self) -> &DisplayFormat {
        &self.format
    }

    /// 12-hour mode is tied to the meridiem label
    pub fn twelve_hour(&self) -> bool {
        self.meridiem.is_some()
    }

    pub fn slots(&self) -> &[DigitSlot] {
        &self.slots
    }

    pub fn meridiem(&self) -> Option<&MeridiemLabel> {
        self.meridiem.as_ref()
    }

    /// Apply a raw time-source value at `now`
    ///
    /// Rejected values leave the clock untouched and come back as
    /// [`TickOutcome::Skipped`]. An `Err` means the decoded digits do not
    /// fit the built slots, which is a construction defect.
    pub fn tick(&mut self, raw: &str, now: Instant) -> Result<TickOutcome> {
        let decoded = match decode(raw, &self.format, self.twelve_hour()) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::trace!("tick skipped: {}", err);
                return Ok(TickOutcome::Skipped(err));
            }
        };

        if decoded.digits.len() != self.slots.len() {
            return Err(ClockError::DigitCountMismatch {
                expected: self.slots.len(),
                actual: decoded.digits.len(),
            });
        }

        let mut flipped = SmallVec::new();
        for (slot, &digit) in self.slots.iter_mut().zip(decoded.digits.iter()) {
            if slot.target() != digit {
                self.animator.start(slot, digit, now);
                flipped.push(slot.index());
            }
        }

        let mut meridiem_changed = false;
        if let (Some(label), Some(meridiem)) = (self.meridiem.as_mut(), decoded.meridiem) {
            if label.current != Some(meridiem) {
                label.current = Some(meridiem);
                meridiem_changed = true;
            }
        }

        if !flipped.is_empty() || meridiem_changed {
            tracing::debug!(
                "tick {:?}: flipping slots {:?}{}",
                raw,
                flipped.as_slice(),
                if meridiem_changed { ", meridiem changed" } else { "" }
            );
        }

        Ok(TickOutcome::Applied {
            flipped,
            meridiem_changed,
        })
    }

    /// Run every animation step due at or before `now`
    pub fn advance(&mut self, now: Instant) -> Vec<AppliedStep> {
        self.animator.advance(&mut self.slots, now)
    }

    /// When the next animation step comes due, if any is queued
    pub fn next_deadline(&self) -> Option<Instant> {
        self.animator.next_deadline()
    }

    pub fn is_animating(&self) -> bool {
        self.slots.iter().any(DigitSlot::is_flipping)
    }

    /// Digits the observer currently sees
    pub fn displayed(&self) -> String {
        self.slots.iter().map(DigitSlot::displayed).collect()
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            format: self.format.clone(),
            slots: self.slots.iter().map(SlotView::from).collect(),
            meridiem: self.meridiem.map(|label| label.text().to_string()),
        }
    }

    /// Remove the last slot so the decoded digits no longer fit
    #[cfg(any(test, feature = "testing"))]
    #[doc(hidden)]
    pub fn drop_last_slot(&mut self) {
        self.slots.pop();
    }
}
