//! Retry helper with bounded linear backoff, used around the `yt-dlp`
//! subprocess where transient network failures are common.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `base_delay * n` before retrying.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Default::default()
        }
    }

    /// Delay after a failed attempt `attempt` (1-based), growing linearly.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(attempt)
            .min(self.max_delay)
    }
}

/// Runs `f` until it succeeds, the error is not retryable, or attempts are
/// exhausted. The last error is returned verbatim.
pub async fn retry_with_backoff<F, T, E, Fut>(
    config: &RetryConfig,
    mut f: F,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut last_error = None;

    for attempt in 1..=config.max_attempts.max(1) {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("operation succeeded on attempt {}", attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                let retryable = is_retryable(&e);
                last_error = Some(e);

                if attempt < config.max_attempts && retryable {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        "operation failed on attempt {}/{}, retrying after {:?}",
                        attempt, config.max_attempts, delay
                    );
                    sleep(delay).await;
                } else {
                    break;
                }
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delay_grows_linearly() {
        let config = RetryConfig::new(5, Duration::from_secs(3));

        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(3));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(6));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(9));
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(12));
    }

    #[test]
    fn delay_is_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: Duration::from_secs(20),
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let config = RetryConfig::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = retry_with_backoff(
            &config,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("transient")
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_terminal_errors() {
        let config = RetryConfig::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = retry_with_backoff(
            &config,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("terminal") }
            },
            |_| false,
        )
        .await;

        assert_eq!(result, Err("terminal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let config = RetryConfig::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = retry_with_backoff(
            &config,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("transient") }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Err("transient"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
