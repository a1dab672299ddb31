//! The top-level research pipeline.
//!
//! One run walks the stages `Planning → Researching → Synthesizing` with
//! strict barriers between them: research starts only after planning
//! finished, synthesis only after every dispatched researcher completed
//! or failed. Failures in planning or synthesis terminate the run;
//! individual researcher failures leave an empty slot and the run
//! proceeds best-effort, even over an empty result set.

use std::sync::Arc;

use quorum_common::{ResearchRun, RunFailure, RunOutcome};
use quorum_executor::TaskExecutor;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::fault::FaultInjection;
use crate::stage::StageRunner;
use crate::subtasks::extract_subtasks;

pub struct ResearchPipeline {
    runner: StageRunner,
    config: PipelineConfig,
    fault: Option<FaultInjection>,
}

impl ResearchPipeline {
    pub fn new(executor: Arc<dyn TaskExecutor>, config: PipelineConfig) -> Self {
        Self {
            runner: StageRunner::new(executor),
            config,
            fault: None,
        }
    }

    /// Wire a caller-supplied fault-injection pair into researcher stages.
    pub fn with_fault_injection(mut self, fault: FaultInjection) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Execute one end-to-end run.
    ///
    /// Never returns an error: stage failures are converted into the
    /// run's terminal state, so callers always receive a [`ResearchRun`]
    /// describing success or a specific failure kind. Dropping the
    /// returned future aborts in-flight researcher tasks.
    pub async fn run(&self, query: &str) -> ResearchRun {
        let mut run = ResearchRun::new(query);
        info!(run_id = %run.id, query = %query, "Starting research run");

        let plan = match self
            .runner
            .run(&planning_instruction(query), &self.config.planner_model)
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                error!(run_id = %run.id, error = %e, "Planning stage failed");
                run.finish(RunOutcome::Failed {
                    reason: RunFailure::Planning {
                        message: e.to_string(),
                    },
                });
                return run;
            }
        };

        run.subtasks = extract_subtasks(&plan);
        info!(
            run_id = %run.id,
            subtasks = run.subtasks.len(),
            "Planning complete"
        );

        run.research_results = self.research_all(query, &run.subtasks).await;
        for slot in run.failed_slots() {
            warn!(run_id = %run.id, slot, "Research slot recorded as failed");
        }

        let instruction = synthesis_instruction(&run.successful_results());
        match self
            .runner
            .run(&instruction, &self.config.synthesizer_model)
            .await
        {
            Ok(report) => {
                info!(run_id = %run.id, "Research run completed");
                run.finish(RunOutcome::Completed { report });
            }
            Err(e) => {
                error!(run_id = %run.id, error = %e, "Synthesis stage failed");
                run.finish(RunOutcome::Failed {
                    reason: RunFailure::Synthesis {
                        message: e.to_string(),
                    },
                });
            }
        }

        run
    }

    /// Fan researcher stages out as worker tasks and join them all before
    /// returning; slot order is preserved regardless of completion order.
    async fn research_all(&self, query: &str, subtasks: &[String]) -> Vec<Option<String>> {
        let mut results: Vec<Option<String>> = vec![None; subtasks.len()];
        if subtasks.is_empty() {
            return results;
        }

        let override_fn = self
            .fault
            .as_ref()
            .filter(|f| f.matches(query))
            .map(|f| f.override_fn().clone());

        let mut set = JoinSet::new();
        for (slot, subtask) in subtasks.iter().enumerate() {
            let runner = self.runner.clone();
            let model = self.config.researcher_model.clone();
            let instruction = research_instruction(subtask);
            let override_fn = override_fn.clone();
            info!(slot, subtask = %subtask, "Dispatching researcher");

            set.spawn(async move {
                let outcome = runner
                    .run_with_override(&instruction, &model, override_fn.as_ref())
                    .await;
                (slot, outcome)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((slot, Ok(result))) => results[slot] = Some(result),
                Ok((slot, Err(e))) => {
                    warn!(slot, error = %e, "Researcher failed");
                }
                Err(e) => {
                    error!(error = %e, "Researcher task join error");
                }
            }
        }

        results
    }
}

fn planning_instruction(query: &str) -> String {
    format!("Break down this research query into 2-3 specific subtasks: \"{query}\"")
}

fn research_instruction(subtask: &str) -> String {
    format!("Research this topic thoroughly: {subtask}")
}

/// Embed the successful research results, labeled by ordinal, into the
/// synthesis prompt. Failed slots contribute nothing.
fn synthesis_instruction(results: &[&str]) -> String {
    let sections = results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("Research Result {}:\n{}\n", i + 1, result))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Synthesize these research results into a comprehensive report:\n\n\
         {sections}\n\n\
         Create a well-structured final report."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_instruction_embeds_query() {
        let instruction = planning_instruction("AI trends in enterprise automation 2024");
        assert_eq!(
            instruction,
            "Break down this research query into 2-3 specific subtasks: \
             \"AI trends in enterprise automation 2024\""
        );
    }

    #[test]
    fn synthesis_instruction_labels_results_in_order() {
        let instruction = synthesis_instruction(&["first finding", "second finding"]);

        let first = instruction.find("Research Result 1:\nfirst finding").unwrap();
        let second = instruction
            .find("Research Result 2:\nsecond finding")
            .unwrap();
        assert!(first < second);
    }

    #[test]
    fn synthesis_instruction_over_empty_results_has_no_sections() {
        let instruction = synthesis_instruction(&[]);
        assert!(!instruction.contains("Research Result"));
        assert!(instruction.contains("Create a well-structured final report."));
    }
}
