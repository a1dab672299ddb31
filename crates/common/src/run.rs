//! Aggregate state of one end-to-end research run.
//!
//! A [`ResearchRun`] is the only artifact that crosses the pipeline
//! boundary: downstream consumers (incident dashboards, issue trackers)
//! read a completed or failed run and never observe intermediate state.

use serde::{Deserialize, Serialize};

/// Why a run terminated without producing a report.
///
/// Individual researcher failures are not a [`RunFailure`]; they are
/// recorded as empty slots on the run itself (see
/// [`ResearchRun::failed_slots`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum RunFailure {
    /// The planning stage failed; no research or synthesis was attempted.
    Planning { message: String },

    /// The synthesis stage failed; research results remain recorded.
    Synthesis { message: String },
}

/// Terminal (or pending) state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Stages are still executing. The pipeline replaces this before
    /// handing the run to the caller.
    InProgress,

    /// All required stages finished; the final report is available.
    Completed { report: String },

    /// A required stage failed; the run is terminal.
    Failed { reason: RunFailure },
}

/// The aggregate record of one pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRun {
    /// Unique run ID
    pub id: String,

    /// The user's research request, read-only after creation
    pub query: String,

    /// Ordered subtasks extracted from the planner output (at most 3)
    pub subtasks: Vec<String>,

    /// One slot per research stage attempted; `None` marks a failed slot
    pub research_results: Vec<Option<String>>,

    /// Current or terminal outcome
    pub outcome: RunOutcome,

    /// Creation timestamp (Unix millis)
    pub created_at: u64,

    /// Completion timestamp (Unix millis), set when the run terminates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
}

impl ResearchRun {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            id: format!("run_{}", uuid::Uuid::new_v4()),
            query: query.into(),
            subtasks: Vec::new(),
            research_results: Vec::new(),
            outcome: RunOutcome::InProgress,
            created_at: now_millis(),
            finished_at: None,
        }
    }

    /// Mark the run terminal with the given outcome.
    pub fn finish(&mut self, outcome: RunOutcome) {
        self.outcome = outcome;
        self.finished_at = Some(now_millis());
    }

    /// Indices of research slots whose stage failed.
    pub fn failed_slots(&self) -> Vec<usize> {
        self.research_results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Successful research results in slot order.
    pub fn successful_results(&self) -> Vec<&str> {
        self.research_results
            .iter()
            .filter_map(|r| r.as_deref())
            .collect()
    }

    /// The final report, if the run completed.
    pub fn report(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::Completed { report } => Some(report),
            _ => None,
        }
    }

    /// The failure reason, if the run failed.
    pub fn failure(&self) -> Option<&RunFailure> {
        match &self.outcome {
            RunOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.outcome, RunOutcome::InProgress)
    }
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
