//! Common types shared across Quorum crates.
//!
//! This crate provides the error type and the run aggregate that the
//! executor and orchestrator crates use to communicate results.

pub mod error;
pub mod run;

pub use error::{QuorumError, Result};
pub use run::{ResearchRun, RunFailure, RunOutcome};
