//! Per-command sequence deduplication.
//!
//! Devices retransmit a message with the same sequence counter when they miss
//! an acknowledgement. Each command id remembers the last sequence it passed;
//! a message is dropped only when its sequence equals that value. There is no
//! window, so the 255 -> 0 wraparound is just another new value.

use tracing::trace;

/// Last accepted sequence per command id.
#[derive(Debug, Clone)]
pub struct SequenceFilter {
    last: [Option<u8>; 256],
}

impl Default for SequenceFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceFilter {
    pub const fn new() -> Self {
        Self { last: [None; 256] }
    }

    /// Returns `true` if the message should be processed.
    pub fn accept(&mut self, command_id: u8, sequence: u8) -> bool {
        let Some(slot) = self.last.get_mut(usize::from(command_id)) else {
            return true;
        };
        if *slot == Some(sequence) {
            trace!(command_id, sequence, "duplicate message dropped");
            return false;
        }
        *slot = Some(sequence);
        true
    }

    pub fn last_sequence(&self, command_id: u8) -> Option<u8> {
        self.last.get(usize::from(command_id)).copied().flatten()
    }

    /// Forget every remembered sequence.
    pub fn reset(&mut self) {
        self.last = [None; 256];
    }
}
