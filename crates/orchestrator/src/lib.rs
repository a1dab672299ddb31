//! Multi-agent research orchestration.
//!
//! A research run fans a query out across a small team of agent tasks and
//! folds their output back into a single report:
//!
//! ```text
//!                       +-----------+
//!            query ---> |  Planner  | ---> subtasks (up to 3)
//!                       +-----------+
//!                             |
//!              +--------------+--------------+
//!              v              v              v
//!        +-----------+ +-----------+ +-----------+
//!        | Researcher| | Researcher| | Researcher|   (concurrent)
//!        +-----------+ +-----------+ +-----------+
//!              |              |              |
//!              +--------------+--------------+
//!                             v
//!                      +-------------+
//!                      | Synthesizer | ---> final report
//!                      +-------------+
//! ```
//!
//! Each agent task is delegated to a [`TaskExecutor`](quorum_executor::TaskExecutor)
//! through [`StageRunner`], which drains the executor's event stream and
//! extracts the terminal payload. [`ResearchPipeline`] owns stage ordering,
//! the research fan-out, and the mapping of stage failures onto the run's
//! terminal state.

pub mod config;
pub mod fault;
pub mod pipeline;
pub mod stage;
pub mod subtasks;

pub use config::PipelineConfig;
pub use fault::FaultInjection;
pub use pipeline::ResearchPipeline;
pub use stage::StageRunner;
pub use subtasks::{extract_subtasks, MAX_SUBTASKS};
