use std::time::Duration;

use tokio::time::Instant;

/// One-shot visual acknowledgment armed when an agent finishes. Active for a
/// fixed window after each trigger, then clears on its own; re-rendering
/// while already completed must not re-arm it, only a fresh trigger does.
pub struct CelebrationGate {
    duration: Duration,
    until: Option<Instant>,
}

impl CelebrationGate {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            until: None,
        }
    }

    pub fn trigger(&mut self) {
        self.until = Some(Instant::now() + self.duration);
    }

    pub fn is_active(&self) -> bool {
        self.until.map(|t| Instant::now() < t).unwrap_or(false)
    }
}
