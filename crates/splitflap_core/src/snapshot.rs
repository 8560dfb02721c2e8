//! Read-only views handed to renderers

use crate::format::DisplayFormat;
use crate::slot::{DigitSlot, FlipPhase};

/// Faces and phase of one slot at an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView {
    pub index: usize,
    pub base: char,
    pub top: char,
    pub incoming: char,
    pub phase: FlipPhase,
}

impl SlotView {
    /// Face on the falling flap (old digit until the promote step)
    pub fn outgoing(&self) -> char {
        self.top
    }
}

impl From<&DigitSlot> for SlotView {
    fn from(slot: &DigitSlot) -> Self {
        Self {
            index: slot.index(),
            base: slot.base(),
            top: slot.top(),
            incoming: slot.incoming(),
            phase: slot.phase(),
        }
    }
}

/// Everything a renderer needs to draw the clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub format: DisplayFormat,
    pub slots: Vec<SlotView>,
    /// `None` when the clock has no meridiem label; `Some("")` before the
    /// first decoded hour
    pub meridiem: Option<String>,
}

impl ClockSnapshot {
    /// Visible digits grouped by field, e.g. `["09", "45"]`
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.format.fields().len());
        let mut slots = self.slots.iter();
        for &width in self.format.fields() {
            fields.push(slots.by_ref().take(width).map(|s| s.top).collect());
        }
        fields
    }

    /// Visible time as text, e.g. `"09:45"`
    pub fn text(&self) -> String {
        self.fields().join(":")
    }

    pub fn is_animating(&self) -> bool {
        self.slots.iter().any(|s| s.phase == FlipPhase::Flipping)
    }
}
