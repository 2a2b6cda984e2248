//! Courtesy pacing between remote calls

use std::time::Duration;

/// Awaits a fixed delay between consecutive remote calls.
///
/// The first call goes out immediately; every later call waits the full
/// delay. Retry backoff is separate and not affected by this.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    primed: bool,
}

impl Pacer {
    /// Create a pacer with the given inter-call delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            primed: false,
        }
    }

    /// A pacer that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait before issuing the next call
    pub async fn pace(&mut self) {
        if self.primed && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.primed = true;
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
