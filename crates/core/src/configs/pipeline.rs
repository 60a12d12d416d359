use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tools::{ToolConfig, ToolKind};
use crate::types::PipelineResult;

/// Pipeline used when the workspace has no `pipewright.yml`
pub const DEFAULT_PIPELINE: &str = include_str!("default_pipeline.yml");

pub const DEFAULT_TOOLS_DIR: &str = "node_modules/.bin";

/// One task entry. Exactly one of `action` (primitive) or `steps` (composite) is set.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub description: Option<String>,
    pub action: Option<ToolKind>,
    pub steps: Option<Vec<String>>,
    /// Configuration key; defaults to the task name.
    pub config: Option<String>,
    /// Task never terminates on its own, so nothing may run after it.
    pub persistent: Option<bool>,
    /// Options to use when the configuration section has no entry for this task.
    pub default: Option<ToolConfig>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Directory holding the external tool executables, relative to the workspace root.
    pub tools_dir: Option<PathBuf>,
    pub tasks: Vec<TaskConfig>,
    #[serde(default)]
    pub config: BTreeMap<String, ToolConfig>,
}

impl PipelineConfig {
    pub fn tools_dir(&self) -> PathBuf {
        self.tools_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOLS_DIR))
    }
}

pub fn parse_pipeline_config(yaml_str: &str) -> PipelineResult<PipelineConfig> {
    let config: PipelineConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_parses() {
        let config = parse_pipeline_config(DEFAULT_PIPELINE).unwrap();

        assert_eq!(config.name.as_deref(), Some("browserfs"));
        assert_eq!(config.tools_dir(), PathBuf::from("node_modules/.bin"));

        let test = config.tasks.iter().find(|t| t.name == "test").unwrap();
        assert_eq!(
            test.steps.as_deref().unwrap(),
            [
                "ts:test",
                "shell:gen_zipfs_fixtures",
                "shell:gen_listings",
                "shell:load_fixtures",
                "connect",
                "karma"
            ]
        );

        let listings = config.config["shell:gen_listings"].as_shell().unwrap();
        assert_eq!(listings.capture, Some(PathBuf::from("listings.json")));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let yaml = "tasks:\n  - name: dev\n    stepz: [\"ts:dev\"]\n";
        assert!(parse_pipeline_config(yaml).is_err());
    }

    #[test]
    fn test_config_section_is_optional() {
        let yaml = "tasks:\n  - name: all\n    steps: [a, b]\n";
        let config = parse_pipeline_config(yaml).unwrap();
        assert!(config.config.is_empty());
        assert_eq!(config.tasks[0].steps.as_ref().unwrap().len(), 2);
    }
}
