//! Exponential backoff with jitter between acquisition attempts.

use rand::Rng;
use std::time::Duration;

/// Shortest delay ever produced, so a fully jittered delay still yields.
const MIN_DELAY: Duration = Duration::from_millis(1);

/// Shape of the retry schedule.
///
/// Attempt `n` (0-based) waits `min(initial * multiplier^n, max)`, shortened by
/// a random fraction in `[0, jitter]` so that simultaneous waiters spread out.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
    pub jitter: f64,
}

impl BackoffPolicy {
    /// Start a fresh schedule for one acquisition call.
    pub fn schedule(&self) -> Backoff {
        Backoff {
            policy: self.clone(),
            attempt: 0,
        }
    }

    /// Un-jittered delay before retry `attempt`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let nanos = self.initial.as_nanos() as f64 * self.multiplier.powi(exponent);

        if !nanos.is_finite() || nanos >= self.max.as_nanos() as f64 {
            self.max
        } else {
            Duration::from_nanos(nanos as u64)
        }
    }
}

/// Per-call iterator over retry delays.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.policy.base_delay(self.attempt);
        self.attempt = self.attempt.saturating_add(1);

        let jitter = self.policy.jitter.clamp(0.0, 1.0);
        let delay = if jitter > 0.0 {
            let shave = rand::rng().random_range(0.0..=jitter);
            base.mul_f64(1.0 - shave)
        } else {
            base
        };

        delay.max(MIN_DELAY).min(self.policy.max.max(MIN_DELAY))
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
