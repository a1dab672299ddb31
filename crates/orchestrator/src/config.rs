//! Configuration for the research pipeline.

use quorum_common::{QuorumError, Result};
use quorum_executor::ExecutorConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Pipeline configuration: executor provider plus per-stage model ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Task executor configuration
    pub executor: ExecutorConfig,

    /// Model used by the planning stage
    #[serde(default = "default_model")]
    pub planner_model: String,

    /// Model used by each research stage
    #[serde(default = "default_model")]
    pub researcher_model: String,

    /// Model used by the synthesis stage
    #[serde(default = "default_model")]
    pub synthesizer_model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig {
                provider: "anthropic".into(),
                api_key: None,
                api_url: None,
                max_concurrent_tasks: 2,
                retry: None,
            },
            planner_model: default_model(),
            researcher_model: default_model(),
            synthesizer_model: default_model(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| QuorumError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_stage_models() {
        let toml_str = r#"
planner_model = "claude-opus-4"
researcher_model = "claude-sonnet-4-20250514"

[executor]
provider = "anthropic"
api_key = "sk-ant-test"
"#;
        let config: PipelineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planner_model, "claude-opus-4");
        assert_eq!(config.researcher_model, "claude-sonnet-4-20250514");
        // Unset stage falls back to the default model
        assert_eq!(config.synthesizer_model, DEFAULT_MODEL);
        assert_eq!(config.executor.provider, "anthropic");
    }

    #[test]
    fn default_config_uses_one_model_everywhere() {
        let config = PipelineConfig::default();
        assert_eq!(config.planner_model, config.researcher_model);
        assert_eq!(config.researcher_model, config.synthesizer_model);
        assert_eq!(config.executor.provider, "anthropic");
    }

    #[test]
    fn from_file_missing_path_is_an_io_error() {
        let err = PipelineConfig::from_file("/nonexistent/quorum-config.toml").unwrap_err();
        assert!(matches!(err, QuorumError::Io(_)));
    }

    #[test]
    fn from_file_rejects_invalid_toml() {
        let path = std::env::temp_dir().join("quorum-config-invalid.toml");
        std::fs::write(&path, "provider = [not toml").unwrap();

        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, QuorumError::Config(_)));

        std::fs::remove_file(&path).ok();
    }
}
