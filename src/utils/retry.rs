use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::RetryPolicy;

impl RetryPolicy {
    /// Runs `operation` until it succeeds or the retry budget is exhausted.
    /// The error of the last attempt is returned.
    ///
    /// Only use this for idempotent operations.
    pub async fn retry<T, F, Fut>(&self, name: &str, mut operation: F) -> anyhow::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "{name} failed (attempt {attempt}/{}), retrying in {delay:?}: {error:?}",
                        self.max_retries + 1
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Exponential backoff with up to 50% random jitter on top, capped at `max_delay`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay);
        let max_jitter = base.as_millis() as u64 / 2;
        let jitter = if max_jitter == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=max_jitter)
        };
        (base + Duration::from_millis(jitter)).min(self.max_delay)
    }
}
