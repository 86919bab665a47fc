//! Session clock: whole seconds since the game started. Never looks at the board.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    elapsed: Duration,
    /// Last time `tick` credited time; None once stopped.
    running_since: Option<Instant>,
}

impl SessionClock {
    pub fn start(now: Instant) -> Self {
        Self {
            elapsed: Duration::ZERO,
            running_since: Some(now),
        }
    }

    /// Credit the time since the previous tick. No-op after `stop`.
    pub fn tick(&mut self, now: Instant) {
        if let Some(since) = self.running_since {
            self.elapsed = self.elapsed.saturating_add(now.saturating_duration_since(since));
            self.running_since = Some(now);
        }
    }

    pub fn stop(&mut self, now: Instant) {
        self.tick(now);
        self.running_since = None;
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }
}
