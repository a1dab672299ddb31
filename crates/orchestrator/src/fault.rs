//! Fault-injection seam for researcher stages.
//!
//! The pair is supplied by the caller; nothing in the pipeline embeds a
//! trigger phrase or a test-only branch.

use std::sync::Arc;

use crate::stage::ResultOverride;

/// Predicate over the original query deciding whether to inject.
pub type QueryPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A caller-supplied predicate/override pair.
///
/// When the predicate matches a run's query, the override is applied to
/// the terminal payload of every researcher stage in that run. Planning
/// and synthesis stages are never overridden.
#[derive(Clone)]
pub struct FaultInjection {
    predicate: QueryPredicate,
    override_fn: ResultOverride,
}

impl FaultInjection {
    pub fn new<P, F>(predicate: P, override_fn: F) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            override_fn: Arc::new(override_fn),
        }
    }

    /// Whether this run's query triggers injection.
    pub fn matches(&self, query: &str) -> bool {
        (self.predicate)(query)
    }

    pub fn override_fn(&self) -> &ResultOverride {
        &self.override_fn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_gates_injection() {
        let fault = FaultInjection::new(
            |query: &str| query.to_lowercase().contains("malformed"),
            |_original| "truncated".to_string(),
        );

        assert!(fault.matches("Demo malformed JSON handling in AI systems"));
        assert!(!fault.matches("AI trends in enterprise automation 2024"));
    }

    #[test]
    fn override_replaces_content() {
        let fault = FaultInjection::new(|_| true, |original| format!("{original} [mutated]"));
        let out = (fault.override_fn())("clean".to_string());
        assert_eq!(out, "clean [mutated]");
    }
}
