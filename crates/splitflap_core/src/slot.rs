//! Digit slots
//!
//! A slot is one flap position of the clock. It carries three faces that
//! together describe what a renderer draws at any instant:
//!
//! - `base`: the committed face behind the flap
//! - `top`: the face the observer reads as the current digit
//! - `incoming`: the face revealed underneath while the flap falls
//!
//! When idle all three agree. During a flip `incoming` already holds the
//! new digit, `top` switches over at the promote step and `base` at the
//! commit step.

/// Animation phase of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlipPhase {
    /// Faces agree, nothing pending
    #[default]
    Idle,
    /// A transition toward `incoming` is underway
    Flipping,
}

/// One digit position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitSlot {
    index: usize,
    base: char,
    top: char,
    incoming: char,
    phase: FlipPhase,
    generation: u64,
}

impl DigitSlot {
    /// Initial face of every slot
    pub const BLANK: char = '0';

    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            base: Self::BLANK,
            top: Self::BLANK,
            incoming: Self::BLANK,
            phase: FlipPhase::Idle,
            generation: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Digit the observer currently sees
    pub fn displayed(&self) -> char {
        self.top
    }

    /// Digit the slot is flipping toward, if a flip is underway
    pub fn pending(&self) -> Option<char> {
        match self.phase {
            FlipPhase::Flipping => Some(self.incoming),
            FlipPhase::Idle => None,
        }
    }

    /// Latest value this slot was asked to show
    ///
    /// Equal to [`displayed`](Self::displayed) when idle.
    pub fn target(&self) -> char {
        self.incoming
    }

    pub fn base(&self) -> char {
        self.base
    }

    pub fn top(&self) -> char {
        self.top
    }

    pub fn incoming(&self) -> char {
        self.incoming
    }

    pub fn phase(&self) -> FlipPhase {
        self.phase
    }

    pub fn is_flipping(&self) -> bool {
        self.phase == FlipPhase::Flipping
    }

    /// Counter identifying the latest flip started on this slot
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a flip toward `value`, returning the new generation
    pub(crate) fn begin_flip(&mut self, value: char) -> u64 {
        self.generation += 1;
        self.incoming = value;
        self.phase = FlipPhase::Flipping;
        self.generation
    }

    pub(crate) fn promote_top(&mut self, value: char) {
        self.top = value;
    }

    pub(crate) fn commit_base(&mut self, value: char) {
        self.base = value;
        self.top = value;
        self.phase = FlipPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_is_blank_and_idle() {
        let slot = DigitSlot::new(3);
        assert_eq!(slot.index(), 3);
        assert_eq!(slot.displayed(), '0');
        assert_eq!(slot.base(), '0');
        assert_eq!(slot.pending(), None);
        assert_eq!(slot.phase(), FlipPhase::Idle);
        assert_eq!(slot.generation(), 0);
    }

    #[test]
    fn test_flip_faces() {
        let mut slot = DigitSlot::new(0);

        let generation = slot.begin_flip('7');
        assert_eq!(generation, 1);
        assert_eq!(slot.pending(), Some('7'));
        assert_eq!(slot.displayed(), '0');
        assert_eq!(slot.incoming(), '7');

        slot.promote_top('7');
        assert_eq!(slot.displayed(), '7');
        assert_eq!(slot.base(), '0');
        assert!(slot.is_flipping());

        slot.commit_base('7');
        assert_eq!(slot.base(), '7');
        assert_eq!(slot.pending(), None);
        assert_eq!(slot.target(), '7');
    }
}
