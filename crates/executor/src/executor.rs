use async_trait::async_trait;
use futures::stream::BoxStream;
use quorum_common::Result;

use crate::event::TaskEvent;

/// A lazy, finite sequence of executor events.
///
/// A well-formed stream yields zero or more in-progress events followed by
/// exactly one [`TaskEvent::Completion`], then ends. An abnormal stream
/// yields an `Err` item instead of a completion and ends. Consumers must
/// drain the stream to its end rather than abandoning it after the first
/// interesting event.
pub type TaskEventStream = BoxStream<'static, Result<TaskEvent>>;

/// The boundary to the opaque task-executing capability.
///
/// Implementations own whatever side effects the task requires (network
/// calls, tool invocations); callers only observe the event stream.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Start one task and return its live event stream.
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream>;

    /// Identifier of this executor, for logging.
    fn name(&self) -> &str;
}

#[async_trait]
impl TaskExecutor for Box<dyn TaskExecutor> {
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream> {
        (**self).invoke(instruction, model_id).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl TaskExecutor for std::sync::Arc<dyn TaskExecutor> {
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream> {
        (**self).invoke(instruction, model_id).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
