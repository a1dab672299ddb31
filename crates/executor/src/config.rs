use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use quorum_common::{QuorumError, Result};
use serde::{Deserialize, Serialize};

use crate::anthropic::AnthropicExecutor;
use crate::executor::{TaskEventStream, TaskExecutor};
use crate::openai::OpenAiExecutor;
use crate::retry::{RetryConfig, RetryingExecutor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Provider type: "anthropic", "openai"
    pub provider: String,

    /// API key for authentication.
    /// If not set, will attempt to read from environment variables:
    /// - ANTHROPIC_API_KEY for Anthropic
    /// - OPENAI_API_KEY for OpenAI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API endpoint (for OpenAI-compatible endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_tasks: usize,

    /// Optional retry policy. Absent means failures surface immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}

fn default_max_concurrent() -> usize {
    2
}

impl ExecutorConfig {
    /// Resolve the API key from config or environment variables.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        let env_var = match self.provider.as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            "openai" => "OPENAI_API_KEY",
            _ => return None,
        };

        std::env::var(env_var).ok()
    }
}

/// Concurrency-limiting wrapper around a [`TaskExecutor`].
///
/// The semaphore permit is acquired before the inner invocation starts and
/// held until the event stream ends, so at most `max_concurrent` tasks are
/// in flight regardless of how many stages were dispatched.
pub struct ThrottledExecutor {
    inner: Arc<dyn TaskExecutor>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl ThrottledExecutor {
    pub fn new(inner: Arc<dyn TaskExecutor>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
        }
    }
}

#[async_trait]
impl TaskExecutor for ThrottledExecutor {
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| QuorumError::ExecutorStream(format!("Semaphore acquire failed: {e}")))?;

        let mut inner_stream = self.inner.invoke(instruction, model_id).await?;

        let stream = try_stream! {
            let _permit = permit;
            while let Some(item) = inner_stream.next().await {
                yield item?;
            }
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Build the configured executor stack: provider, optional retry, throttle.
pub fn build_executor(config: &ExecutorConfig) -> Result<Arc<dyn TaskExecutor>> {
    let base: Box<dyn TaskExecutor> = match config.provider.as_str() {
        "anthropic" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                QuorumError::Config("Anthropic requires an API key".to_string())
            })?;
            Box::new(AnthropicExecutor::new(api_key))
        }
        "openai" => Box::new(OpenAiExecutor::new(
            config.api_url.clone(),
            config.resolve_api_key(),
        )),
        other => {
            return Err(QuorumError::Config(format!(
                "Unknown executor provider: {other}"
            )));
        }
    };

    let base: Arc<dyn TaskExecutor> = match config.retry {
        Some(ref retry) => Arc::new(RetryingExecutor::new(base, retry.clone())),
        None => Arc::from(base),
    };

    Ok(Arc::new(ThrottledExecutor::new(
        base,
        config.max_concurrent_tasks,
    )))
}
