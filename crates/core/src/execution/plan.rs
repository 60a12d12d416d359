//! Expansion of a task name into the flat list of primitive steps it runs
//!
//! Composite tasks are expanded depth-first, left to right. Every name is
//! resolved and every cycle is detected here, so a run either starts with a
//! complete plan or does not start at all.

use tracing::warn;

use crate::registry::{TaskKind, TaskRegistry};
use crate::types::{PipelineError, PipelineResult};

/// One primitive step and the composite tasks it was reached through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub name: String,
    /// Composite tasks from the root down to this step's parent
    pub via: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub task: String,
    pub steps: Vec<PlannedStep>,
    /// Steps listed after a persistent step, which will never run
    pub unreachable: Vec<PlannedStep>,
}

impl ExecutionPlan {
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Build the execution plan for `task`
pub fn resolve_execution_plan(registry: &TaskRegistry, task: &str) -> PipelineResult<ExecutionPlan> {
    let mut steps = Vec::new();
    let mut in_progress = Vec::new();
    expand(registry, task, &mut in_progress, &mut steps)?;

    // A persistent step is always the last one that runs
    let cut = steps.iter().position(|step| {
        matches!(
            registry.resolve(&step.name).map(|t| &t.kind),
            Ok(TaskKind::Primitive(p)) if p.persistent
        )
    });
    let unreachable = match cut {
        Some(index) if index + 1 < steps.len() => {
            let dropped = steps.split_off(index + 1);
            warn!(
                task,
                persistent = %steps[index].name,
                dropped = dropped.len(),
                "steps after a persistent task will not run"
            );
            dropped
        }
        _ => Vec::new(),
    };

    Ok(ExecutionPlan {
        task: task.to_string(),
        steps,
        unreachable,
    })
}

fn expand(
    registry: &TaskRegistry,
    name: &str,
    in_progress: &mut Vec<String>,
    steps: &mut Vec<PlannedStep>,
) -> PipelineResult<()> {
    if let Some(start) = in_progress.iter().position(|n| n == name) {
        let mut chain = in_progress[start..].to_vec();
        chain.push(name.to_string());
        return Err(PipelineError::Cycle(chain));
    }

    match &registry.resolve(name)?.kind {
        TaskKind::Primitive(_) => steps.push(PlannedStep {
            name: name.to_string(),
            via: in_progress.clone(),
        }),
        TaskKind::Composite(sub_tasks) => {
            in_progress.push(name.to_string());
            for sub_task in sub_tasks {
                expand(registry, sub_task, in_progress, steps)?;
            }
            in_progress.pop();
        }
    }

    Ok(())
}
