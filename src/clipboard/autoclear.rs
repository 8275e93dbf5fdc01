//! One-shot clipboard clear deadlines.
//!
//! Each copied secret arms its own deadline. Deadlines are never cancelled:
//! copying a second secret before the first deadline passes leaves both armed,
//! and the earlier one will clear the newer secret.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct AutoclearTimer {
    deadlines: Vec<Instant>,
}

impl AutoclearTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a clear `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadlines.push(now + delay);
    }

    /// Remove every deadline that has passed at `now` and return how many
    /// fired.
    pub fn take_due(&mut self, now: Instant) -> usize {
        let before = self.deadlines.len();
        self.deadlines.retain(|deadline| *deadline > now);
        before - self.deadlines.len()
    }

    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().min().copied()
    }
}
