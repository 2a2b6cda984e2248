//! Retry policy and backoff delays

use rand::Rng;
use std::time::Duration;

/// Upper bound (exclusive) of the random jitter added to every delay
pub const JITTER_CEILING_MS: u64 = 100;

/// Resilience policy for one outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Backoff slots available to 5xx, 429 and transport failures
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (1-based) with a fixed jitter.
    ///
    /// `base * 2^(attempt-1) + jitter_ms`
    pub fn delay_for(&self, attempt: u32, jitter_ms: u64) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor) + Duration::from_millis(jitter_ms)
    }

    /// Delay before retry number `attempt` with uniform jitter in `[0, 100)` ms
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0..JITTER_CEILING_MS);
        self.delay_for(attempt, jitter)
    }

    /// Whether another backoff slot is available after `attempt` retries
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}
