use anyhow::Result;
use colored::*;
use pipewright_core::pipeline::Pipeline;

pub fn execute(pipeline: &Pipeline, task: &str) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), task.cyan());

    let plan = pipeline.plan(task).map_err(|e| {
        if let Some(hint) = super::unknown_task_hint(pipeline, &e) {
            println!("{}", hint);
        }
        anyhow::anyhow!("Failed to get execution plan: {}", e)
    })?;

    println!("\n{}:", "Execution order".bold());
    for (i, step) in plan.steps.iter().enumerate() {
        if step.via.is_empty() {
            println!("  {}. {}", i + 1, step.name);
        } else {
            println!(
                "  {}. {} {}",
                i + 1,
                step.name,
                format!("(via {})", step.via.join(" > ")).dimmed()
            );
        }
    }

    if !plan.unreachable.is_empty() {
        println!(
            "\n{} {}",
            "Never reached (after a persistent step):".yellow(),
            plan.unreachable
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}
