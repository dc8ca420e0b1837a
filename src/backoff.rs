//! # Reconnect Backoff
//!
//! Pure retry-delay computation: the nth failure of a streak sleeps
//! `min(base * multiplier^(n-1), cap)` before the next attempt, up to a hard
//! attempt ceiling. The caller owns the failure counter and resets it to
//! zero on every successful open, so a prolonged stable connection followed
//! by a single drop retries at the fast end of the curve.

use std::time::Duration;

/// Retry delay policy
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// First-retry delay
    pub base: Duration,
    /// Growth factor per retry
    pub multiplier: f64,
    /// Delay ceiling
    pub cap: Duration,
    /// Total connection attempts allowed per failure streak
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            multiplier: 1.5,
            cap: Duration::from_millis(30_000),
            max_attempts: 20,
        }
    }
}

impl ReconnectPolicy {
    /// Create a policy with the default curve and a custom attempt ceiling
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay before the next attempt after the given number of consecutive
    /// failures (1 for the first failure of a streak).
    ///
    /// Returns `None` once the failed attempts have spent the whole budget:
    /// with `max_attempts = N`, exactly N attempts are made and the Nth
    /// failure schedules nothing.
    pub fn delay(&self, failures: u32) -> Option<Duration> {
        if failures >= self.max_attempts {
            return None;
        }

        let exponent = failures.saturating_sub(1);
        let ms = self.base.as_millis() as f64 * self.multiplier.powi(exponent as i32);
        let ms = ms.min(self.cap.as_millis() as f64);
        Some(Duration::from_millis(ms as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_ms(policy: &ReconnectPolicy, failures: u32) -> u64 {
        policy.delay(failures).unwrap().as_millis() as u64
    }

    #[test]
    fn test_backoff_sequence() {
        let policy = ReconnectPolicy::default();

        assert_eq!(delay_ms(&policy, 1), 1000);
        assert_eq!(delay_ms(&policy, 2), 1500);
        assert_eq!(delay_ms(&policy, 3), 2250);
        assert_eq!(delay_ms(&policy, 4), 3375);
        assert_eq!(delay_ms(&policy, 5), 5062);
    }

    #[test]
    fn test_backoff_clamped_at_cap() {
        let policy = ReconnectPolicy::default();

        // 1000 * 1.5^9 ≈ 38443 > 30000
        assert_eq!(delay_ms(&policy, 10), 30_000);
        assert_eq!(delay_ms(&policy, 19), 30_000);
    }

    #[test]
    fn test_attempt_ceiling() {
        let policy = ReconnectPolicy::default();
        assert!(policy.delay(19).is_some());
        assert!(policy.delay(20).is_none());
        assert!(policy.delay(100).is_none());
    }

    #[test]
    fn test_custom_ceiling_spends_the_whole_budget() {
        // max_attempts = 2: the first failure schedules the second attempt,
        // the second failure schedules nothing.
        let policy = ReconnectPolicy::with_max_attempts(2);
        assert_eq!(policy.delay(1), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay(2), None);
    }

    #[test]
    fn test_counter_reset_restarts_curve() {
        // The caller resets the failure counter after a successful open;
        // the next streak starts back at the base delay.
        let policy = ReconnectPolicy::default();
        assert_eq!(delay_ms(&policy, 12), 30_000);
        assert_eq!(delay_ms(&policy, 1), 1000);
    }
}
