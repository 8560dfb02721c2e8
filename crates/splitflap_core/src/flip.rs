//! Flip animator
//!
//! Drives slots through the two-step flip:
//!
//! ```text
//! T+0      Idle -> Flipping, incoming face = new digit
//! T+75ms   top face = new digit (the digit visibly changes)
//! T+250ms  base face = new digit, Flipping -> Idle
//! ```
//!
//! Steps sit in a single timer queue ordered by due time, so slots animate
//! independently and a later tick's steps may interleave with earlier ones.
//! Every step is tagged with the slot generation it was scheduled for.
//! Starting a new flip on a slot bumps its generation, which turns any
//! step still queued for the old flip into a no-op (last write wins).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::slot::DigitSlot;

/// Delay from flip start until the top face shows the new digit
pub const PROMOTE_DELAY: Duration = Duration::from_millis(75);

/// Delay from flip start until the base face is committed and the slot is idle
pub const COMMIT_DELAY: Duration = Duration::from_millis(250);

/// Phase-advance step of a flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlipStep {
    /// Show the new digit on the top face
    PromoteTop,
    /// Commit the new digit to the base face and go idle
    CommitBase,
}

impl FlipStep {
    /// Offset of this step from the start of its flip
    pub fn delay(self) -> Duration {
        match self {
            FlipStep::PromoteTop => PROMOTE_DELAY,
            FlipStep::CommitBase => COMMIT_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ScheduledStep {
    due: Instant,
    // Tie-breaker keeping same-instant steps in scheduling order
    seq: u64,
    slot: usize,
    generation: u64,
    value: char,
    step: FlipStep,
}

/// A step that was applied to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedStep {
    pub slot: usize,
    pub value: char,
    pub step: FlipStep,
}

/// Timer queue of pending flip steps
#[derive(Debug, Default)]
pub struct FlipAnimator {
    queue: BinaryHeap<Reverse<ScheduledStep>>,
    next_seq: u64,
}

impl FlipAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start flipping `slot` toward `value` at `now`
    ///
    /// A flip already underway on the slot is superseded: its remaining
    /// steps are dropped when they come due.
    pub fn start(&mut self, slot: &mut DigitSlot, value: char, now: Instant) {
        let superseded = slot.pending();
        let generation = slot.begin_flip(value);

        if let Some(previous) = superseded {
            tracing::trace!(
                "slot {}: flip toward '{}' superseded by '{}'",
                slot.index(),
                previous,
                value
            );
        }

        for step in [FlipStep::PromoteTop, FlipStep::CommitBase] {
            self.schedule(ScheduledStep {
                due: now + step.delay(),
                seq: 0,
                slot: slot.index(),
                generation,
                value,
                step,
            });
        }
    }

    fn schedule(&mut self, mut step: ScheduledStep) {
        step.seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(step));
    }

    /// When the earliest queued step comes due
    ///
    /// May report a step that turns out to be stale; advancing to it is
    /// then simply a no-op.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.peek().map(|Reverse(step)| step.due)
    }

    /// Number of queued steps, stale ones included
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drop every queued step
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Apply every step due at or before `now`, in due order
    pub fn advance(&mut self, slots: &mut [DigitSlot], now: Instant) -> Vec<AppliedStep> {
        let mut applied = Vec::new();

        while let Some(Reverse(next)) = self.queue.peek() {
            if next.due > now {
                break;
            }
            let Some(Reverse(step)) = self.queue.pop() else {
                break;
            };

            let Some(slot) = slots.get_mut(step.slot) else {
                tracing::warn!("flip step for unknown slot {}", step.slot);
                continue;
            };

            if slot.generation() != step.generation || slot.target() != step.value {
                tracing::trace!(
                    "slot {}: dropping stale {:?} toward '{}'",
                    step.slot,
                    step.step,
                    step.value
                );
                continue;
            }

            match step.step {
                FlipStep::PromoteTop => slot.promote_top(step.value),
                FlipStep::CommitBase => slot.commit_base(step.value),
            }

            applied.push(AppliedStep {
                slot: step.slot,
                value: step.value,
                step: step.step,
            });
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::FlipPhase;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_two_step_timing() {
        let t0 = Instant::now();
        let mut slots = vec![DigitSlot::new(0)];
        let mut animator = FlipAnimator::new();

        animator.start(&mut slots[0], '9', t0);
        assert_eq!(slots[0].incoming(), '9');
        assert_eq!(slots[0].top(), '0');
        assert_eq!(animator.next_deadline(), Some(t0 + PROMOTE_DELAY));

        assert!(animator.advance(&mut slots, t0 + ms(74)).is_empty());
        assert_eq!(slots[0].top(), '0');

        let applied = animator.advance(&mut slots, t0 + ms(75));
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].step, FlipStep::PromoteTop);
        assert_eq!(slots[0].top(), '9');
        assert_eq!(slots[0].base(), '0');
        assert_eq!(slots[0].phase(), FlipPhase::Flipping);

        assert!(animator.advance(&mut slots, t0 + ms(249)).is_empty());
        assert_eq!(slots[0].base(), '0');

        let applied = animator.advance(&mut slots, t0 + ms(250));
        assert_eq!(applied[0].step, FlipStep::CommitBase);
        assert_eq!(slots[0].base(), '9');
        assert_eq!(slots[0].phase(), FlipPhase::Idle);
        assert_eq!(animator.next_deadline(), None);
    }

    #[test]
    fn test_late_advance_applies_steps_in_order() {
        let t0 = Instant::now();
        let mut slots = vec![DigitSlot::new(0)];
        let mut animator = FlipAnimator::new();

        animator.start(&mut slots[0], '4', t0);
        let applied = animator.advance(&mut slots, t0 + ms(1000));
        let steps: Vec<_> = applied.iter().map(|a| a.step).collect();
        assert_eq!(steps, vec![FlipStep::PromoteTop, FlipStep::CommitBase]);
        assert_eq!(slots[0].displayed(), '4');
        assert!(!slots[0].is_flipping());
    }

    #[test]
    fn test_slots_animate_independently() {
        let t0 = Instant::now();
        let mut slots = vec![DigitSlot::new(0), DigitSlot::new(1)];
        let mut animator = FlipAnimator::new();

        animator.start(&mut slots[0], '1', t0);
        animator.start(&mut slots[1], '2', t0 + ms(100));

        animator.advance(&mut slots, t0 + ms(250));
        assert!(!slots[0].is_flipping());
        assert_eq!(slots[1].top(), '2');
        assert!(slots[1].is_flipping());

        animator.advance(&mut slots, t0 + ms(350));
        assert!(!slots[1].is_flipping());
        assert_eq!(slots[1].base(), '2');
    }

    #[test]
    fn test_last_write_wins() {
        let t0 = Instant::now();
        let mut slots = vec![DigitSlot::new(0)];
        let mut animator = FlipAnimator::new();

        animator.start(&mut slots[0], '1', t0);
        animator.advance(&mut slots, t0 + ms(100));
        assert_eq!(slots[0].top(), '1');

        // New target arrives before the first flip commits
        animator.start(&mut slots[0], '2', t0 + ms(150));

        // The first flip's commit step comes due here and must not land
        let applied = animator.advance(&mut slots, t0 + ms(250));
        assert_eq!(
            applied,
            vec![AppliedStep {
                slot: 0,
                value: '2',
                step: FlipStep::PromoteTop,
            }]
        );
        assert_eq!(slots[0].base(), '0');
        assert_eq!(slots[0].top(), '2');
        assert!(slots[0].is_flipping());

        animator.advance(&mut slots, t0 + ms(400));
        assert_eq!(slots[0].base(), '2');
        assert_eq!(slots[0].top(), '2');
        assert!(!slots[0].is_flipping());
    }

    #[test]
    fn test_stale_step_with_same_value_is_dropped() {
        let t0 = Instant::now();
        let mut slots = vec![DigitSlot::new(0)];
        let mut animator = FlipAnimator::new();

        // 0 -> 5 -> 0 -> 5: only the latest flip's timing counts
        animator.start(&mut slots[0], '5', t0);
        animator.start(&mut slots[0], '0', t0 + ms(10));
        animator.start(&mut slots[0], '5', t0 + ms(20));

        animator.advance(&mut slots, t0 + ms(80));
        assert_eq!(slots[0].top(), '0');

        animator.advance(&mut slots, t0 + ms(95));
        assert_eq!(slots[0].top(), '5');

        animator.advance(&mut slots, t0 + ms(260));
        assert!(slots[0].is_flipping());

        animator.advance(&mut slots, t0 + ms(270));
        assert!(!slots[0].is_flipping());
        assert_eq!(animator.queued(), 0);
    }
}
