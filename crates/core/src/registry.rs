//! Named task table
//!
//! The registry is built by the caller before anything runs and handed to the
//! executor by reference. Registering a name twice replaces the earlier
//! definition, which is how variants such as `watch` are layered over `dev`.

use std::collections::HashMap;

use tracing::debug;

use crate::actions::Action;
use crate::configs::tools::ToolConfig;
use crate::types::{PipelineError, PipelineResult};

/// A single side-effecting step
pub struct Primitive {
    pub action: Box<dyn Action>,
    /// Key into the configuration store; `None` when the action takes no options.
    pub config_key: Option<String>,
    /// Options used when the store has no entry for `config_key`.
    pub default_config: Option<ToolConfig>,
    /// The action does not return until interrupted; nothing can run after it.
    pub persistent: bool,
}

impl Primitive {
    pub fn new(action: impl Action + 'static) -> Self {
        Self {
            action: Box::new(action),
            config_key: None,
            default_config: None,
            persistent: false,
        }
    }

    pub fn with_config(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    pub fn with_default(mut self, default: ToolConfig) -> Self {
        self.default_config = Some(default);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

pub enum TaskKind {
    Primitive(Primitive),
    /// Ordered sub-task names, resolved when the task is planned.
    Composite(Vec<String>),
}

pub struct TaskDefinition {
    pub name: String,
    pub description: Option<String>,
    pub kind: TaskKind,
}

impl TaskDefinition {
    pub fn primitive(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: TaskKind::Primitive(primitive),
        }
    }

    pub fn composite<I, S>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            kind: TaskKind::Composite(steps.into_iter().map(Into::into).collect()),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TaskKind::Composite(_))
    }
}

impl std::fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("TaskDefinition");
        s.field("name", &self.name);
        match &self.kind {
            TaskKind::Primitive(p) => s
                .field("config_key", &p.config_key)
                .field("persistent", &p.persistent),
            TaskKind::Composite(steps) => s.field("steps", steps),
        };
        s.finish()
    }
}

#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskDefinition>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task, replacing any task already registered under the same name
    pub fn register(&mut self, task: TaskDefinition) {
        if let Some(previous) = self.tasks.insert(task.name.clone(), task) {
            debug!(task = %previous.name, "task definition replaced");
        }
    }

    pub fn resolve(&self, name: &str) -> PipelineResult<&TaskDefinition> {
        self.tasks
            .get(name)
            .ok_or_else(|| PipelineError::NotFound(name.to_string()))
    }

    /// Registered task names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Tasks in name order
    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        let mut tasks: Vec<&TaskDefinition> = self.tasks.values().collect();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        tasks.into_iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::FnAction;

    fn noop() -> Primitive {
        Primitive::new(FnAction::new(|_| Ok(())))
    }

    #[test]
    fn test_resolve_unknown_task_is_not_found() {
        let registry = TaskRegistry::new();
        let err = registry.resolve("bundle").unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(ref name) if name == "bundle"));
    }

    #[test]
    fn test_register_last_write_wins() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDefinition::composite("watch", ["ts:dev"]));
        registry.register(TaskDefinition::composite("watch", ["ts:watch"]).describe("rebuild"));

        let task = registry.resolve("watch").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(task.description.as_deref(), Some("rebuild"));
        match &task.kind {
            TaskKind::Composite(steps) => assert_eq!(steps, &["ts:watch"]),
            TaskKind::Primitive(_) => panic!("expected composite"),
        }
    }

    #[test]
    fn test_forward_references_are_accepted_at_registration() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDefinition::composite("default", ["ts:dev", "requirejs"]));

        assert!(registry.resolve("default").is_ok());
        assert!(matches!(
            registry.resolve("ts:dev"),
            Err(PipelineError::NotFound(ref name)) if name == "ts:dev"
        ));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDefinition::primitive("karma", noop()));
        registry.register(TaskDefinition::primitive("clean", noop()));
        registry.register(TaskDefinition::composite("test", ["clean", "karma"]));

        assert_eq!(registry.names(), vec!["clean", "karma", "test"]);
        let composites: Vec<_> = registry
            .iter()
            .filter(|t| t.is_composite())
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(composites, vec!["test"]);
    }
}
