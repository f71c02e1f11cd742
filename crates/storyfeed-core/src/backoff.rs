//! Reconnect backoff policy.

use std::time::Duration;

/// Default delay before the first reconnect.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default number of reconnect attempts before a session gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Exponential backoff: `delay(n) = base * 2^(n-1)` for attempts `1..=max_attempts`.
///
/// Pure policy; the session owns the attempt counter and resets it whenever
/// a record is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max_attempts: u32,
}

impl Backoff {
    /// Create a policy with the given base delay and attempt cap.
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    /// Returns the base delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Returns the attempt cap.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    ///
    /// Returns `None` when the attempt is outside the budget, which means
    /// reconnection is abandoned.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.base.saturating_mul(factor))
    }

    /// Returns true once `attempts` reconnects have used up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_from_base() {
        let backoff = Backoff::default();
        let delays: Vec<u128> = (1..=5)
            .map(|n| backoff.delay(n).unwrap().as_millis())
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn sixth_attempt_refused() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(6), None);
        assert!(backoff.exhausted(5));
        assert!(!backoff.exhausted(4));
    }

    #[test]
    fn attempt_zero_has_no_delay() {
        assert_eq!(Backoff::default().delay(0), None);
    }

    #[test]
    fn large_caps_saturate() {
        let backoff = Backoff::new(Duration::from_secs(1), 64);
        assert!(backoff.delay(40).is_some());
        assert!(backoff.delay(64).is_some());
    }
}
