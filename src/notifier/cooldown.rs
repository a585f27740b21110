//! Notification rate limiter.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Owns the last-sent timestamp and the minimum interval between sends.
/// Injected into notifier backends instead of living as process-wide state,
/// so it can be tested with an explicit clock.
pub struct Cooldown {
    interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl Cooldown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: Mutex::new(None),
        }
    }

    /// True if a send is allowed now; records the send time when it is.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Same, against an explicit clock reading.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut last_sent = self.last_sent.lock();
        match *last_sent {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                *last_sent = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_send_allowed() {
        let cooldown = Cooldown::new(Duration::from_secs(30));
        assert!(cooldown.try_acquire_at(Instant::now()));
    }

    #[test]
    fn test_second_send_within_window_suppressed() {
        let cooldown = Cooldown::new(Duration::from_secs(30));
        let start = Instant::now();

        assert!(cooldown.try_acquire_at(start));
        assert!(!cooldown.try_acquire_at(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_send_allowed_after_window_elapses() {
        let cooldown = Cooldown::new(Duration::from_secs(30));
        let start = Instant::now();

        assert!(cooldown.try_acquire_at(start));
        assert!(!cooldown.try_acquire_at(start + Duration::from_secs(29)));
        assert!(cooldown.try_acquire_at(start + Duration::from_secs(30)));
    }

    #[test]
    fn test_suppressed_attempt_does_not_extend_window() {
        let cooldown = Cooldown::new(Duration::from_secs(30));
        let start = Instant::now();

        assert!(cooldown.try_acquire_at(start));
        assert!(!cooldown.try_acquire_at(start + Duration::from_secs(20)));
        // Window is measured from the last successful send, not the attempt.
        assert!(cooldown.try_acquire_at(start + Duration::from_secs(31)));
    }
}
