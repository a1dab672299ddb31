//! Error types for Quorum.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuorumError {
    #[error("Executor stream error: {0}")]
    ExecutorStream(String),

    #[error("Stage execution failed: {0}")]
    StageExecution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuorumError>;
