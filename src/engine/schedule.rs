//! Two-speed commit scheduler.
//!
//! Structural changes (bypass, solo, add/delete/reorder, tempo) must reach
//! the renderer almost immediately; knob commits may be coalesced. Keeping
//! the two as separate deadlines guarantees urgent work is never starved by
//! a stream of parameter commits. Poll-driven: the engine owns no threads or
//! timers, the caller asks "anything due?" with its own clock.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitClass {
    /// Audibility-critical; fixed short delay, keeps the earliest deadline.
    Urgent,
    /// Parameter commits; the deadline resets on every new commit.
    Debounced,
}

#[derive(Debug)]
pub struct CommitScheduler {
    urgent_delay: Duration,
    debounced_delay: Duration,
    urgent_due: Option<Instant>,
    debounced_due: Option<Instant>,
}

impl CommitScheduler {
    pub fn new() -> Self {
        // 80ms keeps toggles under the perception threshold; 400ms coalesces
        // a burst of knob releases into one renderer reconciliation.
        Self::with_delays(Duration::from_millis(80), Duration::from_millis(400))
    }

    pub fn with_delays(urgent: Duration, debounced: Duration) -> Self {
        CommitScheduler {
            urgent_delay: urgent,
            debounced_delay: debounced,
            urgent_due: None,
            debounced_due: None,
        }
    }

    pub fn schedule(&mut self, class: CommitClass, now: Instant) {
        match class {
            CommitClass::Urgent => {
                let due = now + self.urgent_delay;
                self.urgent_due = Some(match self.urgent_due {
                    Some(cur) => cur.min(due),
                    None => due,
                });
                // An urgent commit flushes the whole document anyway.
                self.debounced_due = None;
            }
            CommitClass::Debounced => {
                self.debounced_due = Some(now + self.debounced_delay);
            }
        }
    }

    /// The earliest commit whose deadline has passed, urgent first.
    pub fn poll(&mut self, now: Instant) -> Option<CommitClass> {
        if self.urgent_due.is_some_and(|d| d <= now) {
            self.urgent_due = None;
            return Some(CommitClass::Urgent);
        }
        if self.debounced_due.is_some_and(|d| d <= now) {
            self.debounced_due = None;
            return Some(CommitClass::Debounced);
        }
        None
    }

    /// Next deadline, for callers that sleep between polls.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.urgent_due, self.debounced_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.urgent_due.is_none() && self.debounced_due.is_none()
    }

    pub fn cancel_all(&mut self) {
        self.urgent_due = None;
        self.debounced_due = None;
    }
}

impl Default for CommitScheduler {
    fn default() -> Self {
        Self::new()
    }
}
