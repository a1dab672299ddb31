//! Stage runner: drives one agent task to its terminal result.

use std::sync::Arc;

use futures::StreamExt;
use quorum_common::{QuorumError, Result};
use quorum_executor::{TaskEvent, TaskExecutor};
use tracing::debug;

/// A caller-supplied function that replaces a stage's terminal payload.
///
/// Used by the fault-injection seam to substitute a well-formed result
/// with a malformed one; the stage runner applies it mechanically and
/// carries no trigger logic of its own.
pub type ResultOverride = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Runs a single stage against the task executor and extracts the
/// terminal textual payload from its event stream.
#[derive(Clone)]
pub struct StageRunner {
    executor: Arc<dyn TaskExecutor>,
}

impl StageRunner {
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self { executor }
    }

    /// Run one stage to completion and return the terminal payload.
    ///
    /// Fails if the executor's stream yields an error or ends without a
    /// completion event; the executor's failure reason is carried in the
    /// error message.
    pub async fn run(&self, instruction: &str, model_id: &str) -> Result<String> {
        self.run_with_override(instruction, model_id, None).await
    }

    /// Like [`run`](Self::run), then applies `override_fn` to the
    /// terminal payload before returning it.
    pub async fn run_with_override(
        &self,
        instruction: &str,
        model_id: &str,
        override_fn: Option<&ResultOverride>,
    ) -> Result<String> {
        let mut stream = self
            .executor
            .invoke(instruction, model_id)
            .await
            .map_err(|e| QuorumError::StageExecution(e.to_string()))?;

        // Drain the stream to its end; termination is the executor's call,
        // never ours.
        let mut terminal: Option<String> = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(TaskEvent::Completion { content }) => terminal = Some(content),
                Ok(event) => {
                    debug!(executor = self.executor.name(), ?event, "In-progress event");
                }
                Err(e) => {
                    return Err(QuorumError::StageExecution(format!(
                        "executor stream failed before completion: {e}"
                    )));
                }
            }
        }

        let result = terminal.ok_or_else(|| {
            QuorumError::StageExecution(
                "executor stream ended without a completion event".to_string(),
            )
        })?;

        Ok(match override_fn {
            Some(f) => f(result),
            None => result,
        })
    }
}
