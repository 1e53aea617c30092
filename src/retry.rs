//! Bounded retry with exponential backoff for collaborator calls.
//!
//! Scorer, registry and tone backends are the only calls expected to fail
//! transiently. They are wrapped in a [`RetryPolicy`]; once the attempts are
//! exhausted the caller falls back to its neutral default.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{FactCheckError, RegistryError, ScorerError, ToneError};

/// A retry policy that implements exponential backoff.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create a retry policy with no retries (fail immediately).
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            config: RetryConfig {
                max_retries: 0,
                ..Default::default()
            },
        }
    }

    /// Build a policy from an optional configuration.
    #[must_use]
    pub fn from_config(config: Option<&RetryConfig>) -> Self {
        config.map_or_else(Self::no_retry, |rc| Self::new(rc.clone()))
    }

    /// Get the underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_delay_ms as f64
            * self.config.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.config.max_delay_ms as f64);
        Duration::from_millis(capped_delay as u64)
    }

    /// Execute an async operation with retry logic.
    ///
    /// Non-retryable errors are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns the last error if all retry attempts fail.
    pub async fn retry<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !e.is_retryable() || attempt >= self.config.max_retries {
                        return Err(e);
                    }

                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        "Collaborator call failed, retrying: {}",
                        e.error_message()
                    );

                    tokio::time::sleep(self.calculate_delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Trait for errors that can indicate whether they are retryable.
pub trait Retryable {
    /// Returns true if the error is transient and the operation should be retried.
    fn is_retryable(&self) -> bool;

    /// Returns a human-readable error message for logging.
    fn error_message(&self) -> String;
}

impl Retryable for FactCheckError {
    fn is_retryable(&self) -> bool {
        match self {
            FactCheckError::Registry(e) => e.is_retryable(),
            FactCheckError::Scorer(e) => e.is_retryable(),
            FactCheckError::Tone(e) => e.is_retryable(),
            FactCheckError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            FactCheckError::Pipeline(_)
            | FactCheckError::Config(_)
            | FactCheckError::Serialization(_)
            | FactCheckError::Pattern(_) => false,
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

impl Retryable for RegistryError {
    fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Unavailable(_))
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

impl Retryable for ScorerError {
    fn is_retryable(&self) -> bool {
        match self {
            ScorerError::Unavailable(_) | ScorerError::Timeout(_) => true,
            ScorerError::EmptyInput | ScorerError::OutOfRange(_) => false,
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

impl Retryable for ToneError {
    fn is_retryable(&self) -> bool {
        matches!(self, ToneError::Unavailable(_))
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy::new(
            RetryConfig::new()
                .with_max_retries(max_retries)
                .with_initial_delay_ms(1)
                .with_max_delay_ms(2),
        )
    }

    #[test]
    fn test_retry_policy_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.config().max_retries, 0);
        assert_eq!(RetryPolicy::from_config(None).config().max_retries, 0);
    }

    #[test]
    fn test_calculate_delay() {
        let policy = RetryPolicy::new(
            RetryConfig::new()
                .with_initial_delay_ms(100)
                .with_backoff_multiplier(2.0)
                .with_max_delay_ms(10000),
        );

        assert_eq!(policy.calculate_delay(0).as_millis(), 100);
        assert_eq!(policy.calculate_delay(1).as_millis(), 200);
        assert_eq!(policy.calculate_delay(2).as_millis(), 400);
    }

    #[test]
    fn test_calculate_delay_capped() {
        let policy = RetryPolicy::new(
            RetryConfig::new()
                .with_initial_delay_ms(1000)
                .with_backoff_multiplier(10.0)
                .with_max_delay_ms(5000),
        );
        assert_eq!(policy.calculate_delay(2).as_millis(), 5000);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failures() {
        let policy = fast_policy(3);
        let calls = Arc::new(AtomicUsize::new(0));

        let result = policy
            .retry(|| {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(ScorerError::Unavailable("warming up".into()))
                    } else {
                        Ok(0.7_f32)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(0.7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let policy = fast_policy(2);
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<f32, _> = policy
            .retry(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ScorerError::Timeout(10))
                }
            })
            .await;

        assert_eq!(result, Err(ScorerError::Timeout(10)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let policy = fast_policy(5);
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<(), _> = policy
            .retry(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RegistryError::MalformedEntry {
                        topic: "science".into(),
                        reason: "empty name".into(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ScorerError::Unavailable("x".into()).is_retryable());
        assert!(!ScorerError::EmptyInput.is_retryable());
        assert!(RegistryError::Unavailable("x".into()).is_retryable());
        assert!(ToneError::Unavailable("x".into()).is_retryable());
        assert!(!ToneError::Estimation("x".into()).is_retryable());
        assert!(!FactCheckError::Config("x".into()).is_retryable());
        assert!(FactCheckError::Scorer(ScorerError::Timeout(1)).is_retryable());
    }
}
