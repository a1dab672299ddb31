use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use quorum_common::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::TaskEvent;
use crate::executor::{TaskEventStream, TaskExecutor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Opt-in retry wrapper around a [`TaskExecutor`].
///
/// The pipeline itself never retries; callers who want retry stack this
/// wrapper underneath it. A failed attempt's events are discarded and the
/// stream replays only the succeeding attempt, so consumers still observe
/// exactly one completion.
pub struct RetryingExecutor<T: TaskExecutor + 'static> {
    inner: Arc<T>,
    config: RetryConfig,
}

impl<T: TaskExecutor + 'static> RetryingExecutor<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self {
            inner: Arc::new(inner),
            config,
        }
    }

    fn is_retryable(error_msg: &str) -> bool {
        let lower = error_msg.to_lowercase();
        lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("500")
            || lower.contains("502")
            || lower.contains("503")
            || lower.contains("504")
            || lower.contains("server error")
            || lower.contains("bad gateway")
            || lower.contains("service unavailable")
            || lower.contains("gateway timeout")
    }

    fn parse_retry_after(error_msg: &str) -> Option<u64> {
        let lower = error_msg.to_lowercase();
        let pos = lower.find("retry-after")?;
        let after = &error_msg[pos..];
        for word in after.split_whitespace().skip(1) {
            let cleaned = word.trim_end_matches(|c: char| !c.is_ascii_digit());
            if let Ok(secs) = cleaned.parse::<u64>() {
                return Some(secs * 1000);
            }
        }
        None
    }

    fn compute_delay(config: &RetryConfig, attempt: u32) -> u64 {
        let base = config.initial_delay_ms as f64 * config.backoff_multiplier.powi(attempt as i32);
        let jitter = (base * 0.1 * pseudo_jitter(attempt)) as u64;
        (base as u64).saturating_add(jitter).min(config.max_delay_ms)
    }
}

/// Deterministic jitter based on attempt number, avoiding a rand dependency.
fn pseudo_jitter(attempt: u32) -> f64 {
    let x = attempt.wrapping_mul(2654435761);
    (x % 100) as f64 / 100.0
}

/// Run one full invocation, buffering every event until the stream ends.
async fn drain_attempt<T: TaskExecutor>(
    executor: &T,
    instruction: &str,
    model_id: &str,
) -> Result<Vec<TaskEvent>> {
    let mut stream = executor.invoke(instruction, model_id).await?;
    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(item?);
    }
    Ok(events)
}

#[async_trait]
impl<T: TaskExecutor + 'static> TaskExecutor for RetryingExecutor<T> {
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream> {
        let inner = Arc::clone(&self.inner);
        let config = self.config.clone();
        let instruction = instruction.to_string();
        let model_id = model_id.to_string();

        let stream = try_stream! {
            let mut attempt = 0u32;
            loop {
                match drain_attempt(inner.as_ref(), &instruction, &model_id).await {
                    Ok(events) => {
                        for event in events {
                            yield event;
                        }
                        break;
                    }
                    Err(e) => {
                        let error_msg = e.to_string();
                        if attempt >= config.max_retries
                            || !RetryingExecutor::<T>::is_retryable(&error_msg)
                        {
                            Err(e)?;
                        }

                        let delay = RetryingExecutor::<T>::parse_retry_after(&error_msg)
                            .unwrap_or_else(|| {
                                RetryingExecutor::<T>::compute_delay(&config, attempt)
                            });

                        warn!(
                            attempt = attempt + 1,
                            max_retries = config.max_retries,
                            delay_ms = delay,
                            error = %error_msg,
                            "Retrying task invocation"
                        );

                        tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                        attempt += 1;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_common::QuorumError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyExecutor {
        failures_before_success: u32,
        attempts: AtomicU32,
        error_msg: String,
    }

    impl FlakyExecutor {
        fn new(failures_before_success: u32, error_msg: &str) -> Self {
            Self {
                failures_before_success,
                attempts: AtomicU32::new(0),
                error_msg: error_msg.to_string(),
            }
        }
    }

    #[async_trait]
    impl TaskExecutor for FlakyExecutor {
        async fn invoke(&self, _instruction: &str, _model_id: &str) -> Result<TaskEventStream> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures_before_success {
                let msg = self.error_msg.clone();
                Ok(Box::pin(futures::stream::iter(vec![Err(
                    QuorumError::ExecutorStream(msg),
                )])))
            } else {
                Ok(Box::pin(futures::stream::iter(vec![Ok(
                    TaskEvent::completion("recovered"),
                )])))
            }
        }
        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn default_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 30_000);
        assert!((config.backoff_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn retryable_error_detection() {
        assert!(RetryingExecutor::<FlakyExecutor>::is_retryable(
            "API error 429 Too Many Requests: rate limit exceeded"
        ));
        assert!(RetryingExecutor::<FlakyExecutor>::is_retryable(
            "Anthropic API error 503 Service Unavailable"
        ));
        assert!(!RetryingExecutor::<FlakyExecutor>::is_retryable(
            "API error 401 Unauthorized"
        ));
    }

    #[test]
    fn parse_retry_after_from_error() {
        let msg = "429 Too Many Requests, Retry-After: 5";
        assert_eq!(
            RetryingExecutor::<FlakyExecutor>::parse_retry_after(msg),
            Some(5000)
        );
    }

    #[test]
    fn compute_delay_respects_max() {
        let config = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 500,
            max_delay_ms: 2000,
            backoff_multiplier: 10.0,
        };
        assert!(RetryingExecutor::<FlakyExecutor>::compute_delay(&config, 5) <= 2000);
    }

    #[tokio::test]
    async fn retries_retryable_failures_until_success() {
        let executor =
            RetryingExecutor::new(FlakyExecutor::new(2, "503 service unavailable"), fast_config());

        let mut stream = executor.invoke("instruction", "model").await.unwrap();
        let mut terminal = None;
        while let Some(item) = stream.next().await {
            terminal = Some(item.unwrap());
        }

        assert_eq!(terminal, Some(TaskEvent::completion("recovered")));
        assert_eq!(executor.inner.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let executor =
            RetryingExecutor::new(FlakyExecutor::new(2, "401 Unauthorized"), fast_config());

        let mut stream = executor.invoke("instruction", "model").await.unwrap();
        let first = stream.next().await.unwrap();

        assert!(first.is_err());
        assert_eq!(executor.inner.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let executor =
            RetryingExecutor::new(FlakyExecutor::new(10, "503 service unavailable"), fast_config());

        let mut stream = executor.invoke("instruction", "model").await.unwrap();
        let mut last = None;
        while let Some(item) = stream.next().await {
            last = Some(item);
        }

        assert!(last.unwrap().is_err());
        // Initial attempt plus max_retries
        assert_eq!(executor.inner.attempts.load(Ordering::SeqCst), 4);
    }
}
