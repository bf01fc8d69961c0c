//! Exponential backoff after consecutive task failures.
//!
//! A worker that has failed `n` tasks in a row waits
//! `min(first × factor^(n-1), max)` before starting its next task.
//! The streak belongs to one worker and resets on its first success.
//!
//! ```rust
//! use std::time::Duration;
//! use eth_log_scheduler::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::default();
//! assert_eq!(backoff.delay(0), Duration::ZERO);
//! assert_eq!(backoff.delay(1), Duration::from_secs(1));
//! assert_eq!(backoff.delay(5), Duration::from_secs(16));
//! assert_eq!(backoff.delay(6), Duration::from_secs(30));
//! ```

use std::time::Duration;

/// Delay schedule applied by a worker after failed tasks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failure
    pub first: Duration,
    /// Maximum delay cap
    pub max: Duration,
    /// Multiplicative growth factor per additional failure
    pub factor: f64,
}

impl Default for BackoffPolicy {
    /// `first = 1s`, `factor = 2.0`, `max = 30s`
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(30),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the next task after `failures` consecutive failures.
    ///
    /// Zero failures means no delay. Overflowing or non-finite growth
    /// clamps to [`BackoffPolicy::max`].
    pub fn delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let exp = (failures - 1).min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        let max_secs = self.max.as_secs_f64();

        if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sequence() {
        let policy = BackoffPolicy::default();
        let expected = [1, 2, 4, 8, 16, 30, 30, 30, 30, 30];

        for (i, secs) in expected.iter().enumerate() {
            let failures = i as u32 + 1;
            assert_eq!(
                policy.delay(failures),
                Duration::from_secs(*secs),
                "delay after {} failures",
                failures
            );
        }
    }

    #[test]
    fn test_no_failures_no_delay() {
        assert_eq!(BackoffPolicy::default().delay(0), Duration::ZERO);
    }

    #[test]
    fn test_first_exceeds_max() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 2.0,
        };
        assert_eq!(policy.delay(1), Duration::from_secs(5));
    }

    #[test]
    fn test_constant_factor() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 1.0,
        };
        for failures in 1..10 {
            assert_eq!(policy.delay(failures), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_huge_streak_clamps_to_max() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(100), Duration::from_secs(30));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(30));
    }
}
