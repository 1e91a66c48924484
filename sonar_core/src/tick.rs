//! Fixed-rate tick gate.
//!
//! A tick is due once at least one interval has elapsed since the previous
//! tick. The gate re-arms from the moment it fires, not from the nominal
//! schedule, so a late check never produces a burst of catch-up ticks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TickGate {
    interval: Duration,
    last: Option<Instant>,
}

impl TickGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_hz(hz: u32) -> Self {
        Self::new(crate::util::tick_period(hz))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true (and re-arms) if a tick is due at `now`. The first poll
    /// always fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Time left until the next tick is due (zero if already due).
    pub fn until_due(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => (last + self.interval).saturating_duration_since(now),
        }
    }
}
