//! Cycle counting and write policy selection.

use std::fmt;

/// How chunks of a cycle are positioned in the replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Seek to offset 0 before every chunk.
    Stomp,
    /// Write at the current position.
    Append,
}

impl WritePolicy {
    /// Returns true for [`WritePolicy::Stomp`].
    pub fn is_stomp(&self) -> bool {
        matches!(self, WritePolicy::Stomp)
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::Stomp => f.write_str("stomp"),
            WritePolicy::Append => f.write_str("append"),
        }
    }
}

/// Completed-cycle counter; its parity selects the write policy.
///
/// Starts at 0 (a stomp cycle) and advances once per completed cycle, so
/// every chunk of a cycle observes the same parity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounter {
    value: u64,
}

impl CycleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed cycles.
    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns true while the counter is even.
    #[inline]
    pub fn is_even(&self) -> bool {
        self.value % 2 == 0
    }

    /// Policy for the cycle about to run.
    pub fn policy(&self) -> WritePolicy {
        if self.is_even() {
            WritePolicy::Stomp
        } else {
            WritePolicy::Append
        }
    }

    /// Marks one cycle complete.
    pub fn advance(&mut self) {
        self.value = self.value.wrapping_add(1);
    }
}

/// Outcome of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Counter value the cycle ran under.
    pub cycle: u64,
    /// Policy applied to every chunk of the cycle.
    pub policy: WritePolicy,
    /// Chunks committed.
    pub chunks: usize,
    /// Bytes written (including overwritten bytes).
    pub bytes_written: usize,
    /// Replica length after the cycle.
    pub replica_len: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_alternates_policy() {
        let mut counter = CycleCounter::new();
        assert_eq!(counter.policy(), WritePolicy::Stomp);
        counter.advance();
        assert_eq!(counter.policy(), WritePolicy::Append);
        counter.advance();
        assert_eq!(counter.policy(), WritePolicy::Stomp);
        assert_eq!(counter.value(), 2);
    }
}
