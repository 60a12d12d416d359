//! Sequential pipeline runner
//!
//! Runs the steps of an [`ExecutionPlan`] one after another, awaiting each
//! before the next starts. The first failure stops the run; steps that
//! already finished are not undone.

use std::path::Path;
use std::time::Instant;

use colored::*;
use tracing::{debug, info};

use crate::actions::TaskContext;
use crate::adapters::Toolbox;
use crate::configs::store::ConfigStore;
use crate::execution::plan::{resolve_execution_plan, ExecutionPlan};
use crate::registry::{TaskKind, TaskRegistry};
use crate::results::RunSummary;
use crate::types::{PipelineError, PipelineResult};

/// Executes tasks against a fixed registry, configuration and toolbox
pub struct TaskRunner<'a> {
    registry: &'a TaskRegistry,
    config: &'a ConfigStore,
    toolbox: &'a Toolbox,
    root: &'a Path,
}

impl<'a> TaskRunner<'a> {
    pub fn new(
        registry: &'a TaskRegistry,
        config: &'a ConfigStore,
        toolbox: &'a Toolbox,
        root: &'a Path,
    ) -> Self {
        Self {
            registry,
            config,
            toolbox,
            root,
        }
    }

    pub fn plan(&self, task_name: &str) -> PipelineResult<ExecutionPlan> {
        resolve_execution_plan(self.registry, task_name)
    }

    /// Run a task to completion or first failure
    pub async fn run(&self, task_name: &str) -> PipelineResult<RunSummary> {
        let plan = self.plan(task_name)?;
        self.run_plan(&plan).await
    }

    pub async fn run_plan(&self, plan: &ExecutionPlan) -> PipelineResult<RunSummary> {
        let started = Instant::now();
        let total = plan.steps.len();
        let mut completed = Vec::with_capacity(total);

        for (index, step) in plan.steps.iter().enumerate() {
            let stage = index + 1;

            println!();
            println!(
                "┌─ {} {}",
                format!("Running task '{}'", step.name).bold(),
                format!("({}/{})", stage, total).bright_black()
            );
            if !step.via.is_empty() {
                println!("└─ {} {}", "Via:".bright_black(), step.via.join(" > "));
            }

            let step_started = Instant::now();
            if let Err(source) = self.run_step(&step.name).await {
                debug!(task = %plan.task, step = %step.name, stage, total, "step failed");
                return Err(PipelineError::Step {
                    task: plan.task.clone(),
                    step: step.name.clone(),
                    stage,
                    total,
                    source: Box::new(source),
                });
            }

            info!(step = %step.name, elapsed_ms = step_started.elapsed().as_millis() as u64, "step finished");
            println!(
                "{} {}",
                "✓".green().bold(),
                format!("Completed {}", step.name).green()
            );
            completed.push(step.name.clone());
        }

        Ok(RunSummary {
            task: plan.task.clone(),
            completed,
            skipped: plan.unreachable.iter().map(|s| s.name.clone()).collect(),
            elapsed: started.elapsed(),
        })
    }

    async fn run_step(&self, name: &str) -> PipelineResult<()> {
        let primitive = match &self.registry.resolve(name)?.kind {
            TaskKind::Primitive(primitive) => primitive,
            TaskKind::Composite(_) => {
                return Err(PipelineError::Config(format!(
                    "planned step '{}' is not a primitive task",
                    name
                )))
            }
        };

        let ctx = TaskContext {
            task: name,
            root: self.root,
            config: self.config,
            toolbox: self.toolbox,
            config_key: primitive.config_key.as_deref(),
            default_config: primitive.default_config.as_ref(),
        };
        primitive.action.run(&ctx).await
    }
}
