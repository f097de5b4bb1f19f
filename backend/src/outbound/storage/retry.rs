//! Retry-with-backoff policy for attachment store calls.
//!
//! Only transport-level failures are retried; a provider rejection means
//! the same request would be rejected again. Delays grow exponentially
//! with a random jitter so concurrent callers do not retry in lockstep.

use std::time::Duration;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use crate::domain::ports::AttachmentStoreError;

/// Retry policy applied around each store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Build a policy with an explicit retry budget and base delay.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (zero-based): exponential in the
    /// attempt with up to 50% random jitter added on top.
    fn backoff_delay(&self, attempt: u32, rng: &mut impl Rng) -> Duration {
        let exp = self.base_delay.saturating_mul(1_u32 << attempt.min(16));
        let jitter = exp.mul_f64(rng.gen_range(0.0..0.5));
        exp + jitter
    }

    /// Run `operation`, retrying transient failures up to the budget.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, AttachmentStoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttachmentStoreError>>,
    {
        let mut rng = SmallRng::from_entropy();
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt, &mut rng);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying transient store failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
