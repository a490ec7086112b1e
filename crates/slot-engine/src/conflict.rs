//! Remove candidate slots that collide with participants' busy intervals.
//!
//! Two ranges overlap when `a.start < b.end && b.start < a.end`, so a slot that
//! ends exactly when a busy interval starts is NOT a conflict. With a buffer,
//! the gap on either side of the slot must also be at least `buffer` long.

use chrono::Duration;

use crate::model::{BusyInterval, CandidateSlot};

/// One participant's busy intervals plus the gap they require around them.
#[derive(Debug, Clone, Copy)]
pub struct ParticipantBusy<'a> {
    pub busy: &'a [BusyInterval],
    pub buffer: Duration,
}

impl<'a> ParticipantBusy<'a> {
    /// Busy intervals checked by strict overlap only.
    pub fn strict(busy: &'a [BusyInterval]) -> Self {
        Self {
            busy,
            buffer: Duration::zero(),
        }
    }

    pub fn buffered(busy: &'a [BusyInterval], buffer: Duration) -> Self {
        Self { busy, buffer }
    }

    fn blocks(&self, slot: &CandidateSlot) -> bool {
        self.busy
            .iter()
            .any(|interval| conflicts_with_buffer(slot, interval, self.buffer))
    }
}

/// Strict half-open overlap between a slot and a busy interval.
pub fn overlaps(slot: &CandidateSlot, interval: &BusyInterval) -> bool {
    slot.start < interval.end && interval.start < slot.end
}

/// Overlap after widening the slot by `buffer` on both sides.
///
/// Rejects a slot whose start is less than `buffer` after the interval ends,
/// or whose end is less than `buffer` before the interval starts.
pub fn conflicts_with_buffer(slot: &CandidateSlot, interval: &BusyInterval, buffer: Duration) -> bool {
    slot.start < interval.end + buffer && interval.start < slot.end + buffer
}

/// Keep only slots no participant is busy for.
pub fn filter_conflicts(slots: Vec<CandidateSlot>, participants: &[ParticipantBusy<'_>]) -> Vec<CandidateSlot> {
    slots
        .into_iter()
        .filter(|slot| !participants.iter().any(|p| p.blocks(slot)))
        .collect()
}
