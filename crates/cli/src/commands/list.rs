use anyhow::Result;
use colored::*;
use pipewright_core::pipeline::{Pipeline, PipelineSource};

pub fn execute(pipeline: &Pipeline) -> Result<()> {
    let heading = match (&pipeline.name, &pipeline.source) {
        (Some(name), PipelineSource::BuiltIn) => format!("Tasks in {} (built-in)", name),
        (Some(name), PipelineSource::File(_)) => format!("Tasks in {}", name),
        (None, _) => "Tasks".to_string(),
    };
    println!("{}", heading.bold().underline());

    let tasks = pipeline.tasks();
    if tasks.is_empty() {
        println!("  {}", "No tasks defined".dimmed());
        return Ok(());
    }

    for task in tasks {
        let mut line = match &task.steps {
            Some(_) => task.name.blue().bold().to_string(),
            None => task.name.cyan().to_string(),
        };
        if task.persistent {
            line.push_str(&format!(" {}", "[persistent]".yellow()));
        }
        println!("{}", line);

        if let Some(description) = &task.description {
            println!("  {}", description.dimmed());
        }
        if let Some(steps) = &task.steps {
            println!("  {} {}", "runs:".dimmed(), steps.join(" → "));
        }
    }

    Ok(())
}
