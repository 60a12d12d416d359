//! Per-task configuration lookup
//!
//! The store is filled once at startup from the pipeline file and is read-only
//! afterwards.

use std::collections::HashMap;

use crate::configs::tools::ToolConfig;
use crate::types::{PipelineError, PipelineResult};

#[derive(Debug, Default, Clone)]
pub struct ConfigStore {
    entries: HashMap<String, ToolConfig>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task_id: impl Into<String>, config: ToolConfig) {
        self.entries.insert(task_id.into(), config);
    }

    /// Configuration for `task_id`, failing if there is no entry
    pub fn get(&self, task_id: &str) -> PipelineResult<&ToolConfig> {
        self.entries
            .get(task_id)
            .ok_or_else(|| PipelineError::MissingConfiguration(task_id.to_string()))
    }

    /// Configuration for `task_id`, falling back to the task's declared default
    pub fn resolve<'a>(
        &'a self,
        task_id: &str,
        default: Option<&'a ToolConfig>,
    ) -> PipelineResult<&'a ToolConfig> {
        match self.entries.get(task_id) {
            Some(config) => Ok(config),
            None => default.ok_or_else(|| PipelineError::MissingConfiguration(task_id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ToolConfig)> for ConfigStore {
    fn from_iter<I: IntoIterator<Item = (String, ToolConfig)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::tools::{ServerOptions, TestRunnerOptions};

    fn karma() -> ToolConfig {
        ToolConfig::Test(TestRunnerOptions {
            config_file: "test/karma.conf.js".into(),
            single_run: true,
        })
    }

    #[test]
    fn test_get_returns_registered_entry() {
        let mut store = ConfigStore::new();
        store.insert("karma", karma());

        assert_eq!(store.get("karma").unwrap(), &karma());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_entry_without_default_fails() {
        let store = ConfigStore::new();

        let err = store.resolve("connect", None).unwrap_err();
        assert!(matches!(err, PipelineError::MissingConfiguration(ref id) if id == "connect"));
        assert!(matches!(
            store.get("connect"),
            Err(PipelineError::MissingConfiguration(_))
        ));
    }

    #[test]
    fn test_declared_default_is_used_when_entry_is_absent() {
        let store = ConfigStore::new();
        let default = ToolConfig::Serve(ServerOptions::default());

        let resolved = store.resolve("connect", Some(&default)).unwrap();
        assert_eq!(resolved.as_server().unwrap().port, 8000);
    }

    #[test]
    fn test_entry_wins_over_default() {
        let mut store = ConfigStore::new();
        store.insert(
            "connect",
            ToolConfig::Serve(ServerOptions {
                port: 9000,
                ..ServerOptions::default()
            }),
        );
        let default = ToolConfig::Serve(ServerOptions::default());

        let resolved = store.resolve("connect", Some(&default)).unwrap();
        assert_eq!(resolved.as_server().unwrap().port, 9000);
    }
}
