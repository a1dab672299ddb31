//! Task executor boundary for Quorum.
//!
//! A task executor accepts a textual instruction and a model identifier
//! and produces a live stream of [`TaskEvent`]s terminated by a single
//! completion event. The orchestrator consumes these streams without
//! knowing anything about the side effects behind them.
//!
//! ```text
//!                 invoke(instruction, model_id)
//!  Orchestrator ────────────────────────────────► TaskExecutor
//!                                                     │
//!       ◄── Started ── Progress ── ... ── Completion ─┘
//! ```
//!
//! Providers: [`AnthropicExecutor`] (Messages API) and [`OpenAiExecutor`]
//! (chat-completions format, Ollama-compatible). Wrappers:
//! [`RetryingExecutor`] (opt-in backoff) and [`ThrottledExecutor`]
//! (concurrency cap).

pub mod anthropic;
pub mod config;
pub mod event;
pub mod executor;
pub mod openai;
pub mod retry;

pub use anthropic::AnthropicExecutor;
pub use config::{build_executor, ExecutorConfig, ThrottledExecutor};
pub use event::TaskEvent;
pub use executor::{TaskEventStream, TaskExecutor};
pub use openai::OpenAiExecutor;
pub use retry::{RetryConfig, RetryingExecutor};
