#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// Retries any error a fixed number of times with a fixed pause in between.
/// There is no backoff and no jitter, and no error is considered fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> RetryPolicy {
        return RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(3),
        };
    }
}

impl RetryPolicy {
    pub fn from_config() -> Result<RetryPolicy> {
        return Ok(RetryPolicy {
            max_attempts: u32::try_from(Config::get_u64(ConfigKey::RoastAttempts)?)?,
            delay: Duration::from_millis(Config::get_u64(ConfigKey::RoastRetryDelay)?),
        });
    }

    /// Runs `operation` until it succeeds or attempts run out, returning the
    /// last error. The operation receives the 1-based attempt number.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match operation(attempt).await {
                Ok(res) => return Ok(res),
                Err(err) => err,
            };

            tracing::warn!(attempt, max_attempts, error = ?err, "Attempt failed");
            if attempt >= max_attempts {
                return Err(err);
            }

            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}
