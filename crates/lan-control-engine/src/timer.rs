//! Cancellable deadlines owned by engine state.
//!
//! The engine never sleeps. Each timer is a deadline that the controller
//! observes through `next_deadline` and fires by calling back with the
//! current instant.

use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    /// (Re)start the timer so it fires `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Start the timer unless it is already running. Returns whether it was started.
    pub fn arm_if_idle(&mut self, now: Instant, after: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.arm(now, after);
        true
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
