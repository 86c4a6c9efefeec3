//! Handle-based recurring-task scheduler.
//!
//! Models the host's periodic timer primitive on a single-threaded event
//! loop: the host calls [`Scheduler::poll`] from its loop and dispatches the
//! returned ids. No timer callback runs outside `poll`, so cancellation is
//! synchronous: after [`Scheduler::cancel`] returns, the id is never
//! returned again.

use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    interval: Duration,
    next_fire: Instant,
}

#[derive(Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a repeating timer first due at `now + interval`.
    pub fn schedule(&mut self, interval: Duration, now: Instant) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer {
            id,
            interval,
            next_fire: now + interval,
        });
        id
    }

    /// Removes a timer. Returns false if the id was already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Returns the ids due at `now`, in registration order. A due timer
    /// fires at most once per poll and is rescheduled from `now`, so a loop
    /// stall does not produce a burst of catch-up ticks.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due = Vec::new();
        for timer in &mut self.timers {
            if timer.next_fire <= now {
                due.push(timer.id);
                timer.next_fire = now + timer.interval;
            }
        }
        due
    }

    /// Earliest pending deadline, for hosts that sleep between polls.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.next_fire).min()
    }
}
