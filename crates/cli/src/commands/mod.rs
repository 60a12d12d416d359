use colored::*;
use pipewright_core::pipeline::Pipeline;
use pipewright_core::types::PipelineError;

pub mod list;
pub mod plan;
pub mod run;
pub mod schema;

/// Message for an unknown task, naming the tasks that do exist
pub fn unknown_task_hint(pipeline: &Pipeline, err: &PipelineError) -> Option<String> {
    match err.root_cause() {
        PipelineError::NotFound(_) => Some(format!(
            "{} {}",
            "Available tasks:".yellow(),
            pipeline.registry().names().join(", ")
        )),
        _ => None,
    }
}
