//! Result types for pipeline operations
//!
//! This module contains the result types returned by [`Pipeline`](crate::pipeline::Pipeline)
//! operations, providing a centralized location for output structures.

use std::time::Duration;

use crate::registry::{TaskDefinition, TaskKind};

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub task: String,
    /// Primitive steps that ran, in order
    pub completed: Vec<String>,
    /// Steps that were listed after a persistent step
    pub skipped: Vec<String>,
    pub elapsed: Duration,
}

/// Listing entry for a registered task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: String,
    pub description: Option<String>,
    /// Sub-task names for composite tasks
    pub steps: Option<Vec<String>>,
    pub persistent: bool,
}

impl From<&TaskDefinition> for TaskInfo {
    fn from(task: &TaskDefinition) -> Self {
        let (steps, persistent) = match &task.kind {
            TaskKind::Composite(steps) => (Some(steps.clone()), false),
            TaskKind::Primitive(primitive) => (None, primitive.persistent),
        };
        Self {
            name: task.name.clone(),
            description: task.description.clone(),
            steps,
            persistent,
        }
    }
}
