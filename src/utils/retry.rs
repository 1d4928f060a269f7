use crate::error::ApiError;
use backoff::{ExponentialBackoff, backoff::Backoff};
use std::future::Future;
use std::time::Duration;

/// Retry configuration for API operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (initial call included)
    pub max_retries: u32,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Config for quick retry (shorter delays, fewer attempts)
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
            multiplier: 1.5,
        }
    }
}

/// Retry executor with a configurable backoff policy.
///
/// Only transient API errors are retried; access, not-found and other
/// final failures are returned to the caller on the first attempt.
#[derive(Debug)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an async operation with retry logic
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_delay,
            max_interval: self.config.max_delay,
            multiplier: self.config.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    if let Some(delay) = backoff.next_backoff() {
                        log::debug!("Retrying after {:?} (attempt {}): {}", delay, attempt, error);
                        tokio::time::sleep(delay).await;
                    } else {
                        log::warn!(
                            "Max retry attempts reached ({}), giving up",
                            self.config.max_retries
                        );
                        return Err(error);
                    }
                }
            }
        }
    }

    fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        if attempt >= self.config.max_retries {
            return false;
        }
        error.is_transient()
    }
}

/// Convenience function for default retry behavior
pub async fn with_retry<F, Fut, T>(operation: F) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let executor = RetryExecutor::new(RetryConfig::default());
    executor.execute(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_success_immediate() {
        let executor = RetryExecutor::new(RetryConfig::default());

        let result = executor.execute(|| async { Ok::<i32, ApiError>(42) }).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_access_denied() {
        let executor = RetryExecutor::new(RetryConfig::default());
        let attempts = AtomicU32::new(0);

        let result: Result<String, ApiError> = executor
            .execute(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ApiError::AccessDenied {
                        endpoint: "list_queues".to_string(),
                        message: "denied".to_string(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_throttling() {
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 1.0,
        });
        let attempts = AtomicU32::new(0);

        let result = executor
            .execute(|| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ApiError::Throttled {
                            endpoint: "list_users".to_string(),
                            message: "rate exceeded".to_string(),
                        })
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_returns_last_error() {
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 1.0,
        });

        let result: Result<(), ApiError> = executor
            .execute(|| async {
                Err(ApiError::Http {
                    status: 503,
                    endpoint: "list_instances".to_string(),
                    message: "unavailable".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(ApiError::Http { status: 503, .. })));
    }

    #[test]
    fn test_retry_config_presets() {
        let default = RetryConfig::default();
        assert_eq!(default.max_retries, 3);

        let quick = RetryConfig::quick();
        assert_eq!(quick.max_retries, 2);
        assert_eq!(quick.initial_delay, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_convenience_function() {
        let result = with_retry(|| async { Ok::<String, ApiError>("success".to_string()) }).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "success");
    }
}
