//! Text generation contract and retry wrapper
//!
//! A generator takes system instructions plus a prompt and returns generated
//! text in a single request/response exchange. [`RetryingGenerator`] layers a
//! per-attempt timeout and bounded exponential backoff on top of any
//! generator, retrying only errors classified as transient.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AssistantConfig;

/// One generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_instructions: String,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(system_instructions: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            prompt: prompt.into(),
        }
    }
}

/// Text generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a request
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: TextGenerator + ?Sized> TextGenerator for Arc<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}

/// Generation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Network failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the attempt timeout
    #[error("Request timed out")]
    Timeout,

    /// Provider asked us to slow down
    #[error("Rate limited by provider")]
    RateLimited,

    /// Provider-side failure
    #[error("Provider error: HTTP {0}")]
    Server(u16),

    /// Missing or rejected credentials
    #[error("Unauthorized: check the API key")]
    Unauthorized,

    /// Request the provider will never accept
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response carried no text
    #[error("Provider returned no text")]
    EmptyResponse,

    /// Success status with a body that is not a completion
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Whether another attempt might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationError::Transport(_)
                | GenerationError::Timeout
                | GenerationError::RateLimited
                | GenerationError::Server(_)
        )
    }
}

/// Timeout and backoff settings for [`RetryingGenerator`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    /// Deadline for each individual attempt
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub fn none(attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            max_attempts: config.retry.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.retry.max_backoff_ms),
            multiplier: config.retry.multiplier,
            attempt_timeout: config.request_timeout(),
        }
    }

    /// Delay before retry number `retry` (1-based), capped at `max_backoff`.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let scaled = self.initial_backoff.as_nanos() as f64 * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_backoff.as_nanos() as f64);
        Duration::from_nanos(capped.max(0.0).round() as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&AssistantConfig::default())
    }
}

/// Generator wrapper adding timeout and retry
pub struct RetryingGenerator<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: TextGenerator> RetryingGenerator<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for RetryingGenerator<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut attempt = 1;
        loop {
            let outcome =
                match tokio::time::timeout(self.policy.attempt_timeout, self.inner.generate(request))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(GenerationError::Timeout),
                };

            match outcome {
                Ok(text) => {
                    debug!(attempt, "generation succeeded");
                    return Ok(text);
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    warn!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "generation failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "generation failed");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays a fixed list of outcomes, one per call
    struct Scripted {
        outcomes: Mutex<VecDeque<Result<String, GenerationError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyResponse))
        }
    }

    struct Slow;

    #[async_trait]
    impl TextGenerator for Slow {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok("late".into())
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            multiplier: 2.0,
            attempt_timeout: Duration::from_secs(5),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("be brief", "hello")
    }

    #[test]
    fn test_transient_classification() {
        assert!(GenerationError::Timeout.is_transient());
        assert!(GenerationError::RateLimited.is_transient());
        assert!(GenerationError::Server(503).is_transient());
        assert!(GenerationError::Transport("reset".into()).is_transient());
        assert!(!GenerationError::Unauthorized.is_transient());
        assert!(!GenerationError::InvalidRequest("bad".into()).is_transient());
        assert!(!GenerationError::EmptyResponse.is_transient());
        assert!(!GenerationError::MalformedResponse("eof".into()).is_transient());
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            multiplier: 2.0,
            attempt_timeout: Duration::from_secs(1),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_for(10), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let inner = Arc::new(Scripted::new(vec![
            Err(GenerationError::Server(502)),
            Err(GenerationError::RateLimited),
            Ok("done".into()),
        ]));
        let generator = RetryingGenerator::new(Arc::clone(&inner), fast_policy(3));

        assert_eq!(generator.generate(&request()).await.unwrap(), "done");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let inner = Arc::new(Scripted::new(vec![
            Err(GenerationError::Transport("reset".into())),
            Err(GenerationError::Transport("reset".into())),
            Ok("never reached".into()),
        ]));
        let generator = RetryingGenerator::new(Arc::clone(&inner), fast_policy(2));

        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::Transport("reset".into()));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let inner = Arc::new(Scripted::new(vec![
            Err(GenerationError::Unauthorized),
            Ok("never reached".into()),
        ]));
        let generator = RetryingGenerator::new(Arc::clone(&inner), fast_policy(5));

        assert_eq!(
            generator.generate(&request()).await,
            Err(GenerationError::Unauthorized)
        );
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_not_retried() {
        let inner = Arc::new(Scripted::new(vec![
            Err(GenerationError::MalformedResponse("expected value".into())),
            Ok("never reached".into()),
        ]));
        let generator = RetryingGenerator::new(Arc::clone(&inner), fast_policy(3));

        assert!(matches!(
            generator.generate(&request()).await,
            Err(GenerationError::MalformedResponse(_))
        ));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_timeout() {
        let generator = RetryingGenerator::new(Slow, RetryPolicy::none(Duration::from_millis(10)));
        assert_eq!(
            generator.generate(&request()).await,
            Err(GenerationError::Timeout)
        );
    }

    #[test]
    fn test_policy_from_config() {
        let config = AssistantConfig::default();
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
        assert_eq!(policy.attempt_timeout, Duration::from_secs(30));
    }
}
