use anyhow::Result;
use colored::*;
use pipewright_core::pipeline::Pipeline;

pub async fn execute(pipeline: &Pipeline, task: &str) -> Result<()> {
    println!("{} {}", "Running task".bold(), task.cyan());

    let summary = match pipeline.run(task).await {
        Ok(summary) => summary,
        Err(e) => {
            println!();
            let failed_at = e.failing_step().unwrap_or(task);
            println!(
                "{} {}",
                "✗".red().bold(),
                format!("Task '{}' failed at '{}'", task, failed_at).red().bold()
            );
            if let Some(hint) = super::unknown_task_hint(pipeline, &e) {
                println!("{}", hint);
            }
            // Task and step were named above
            return Err(anyhow::anyhow!("Failed to run task: {}", e.root_cause()));
        }
    };

    if !summary.skipped.is_empty() {
        println!(
            "{} {}",
            "Not run after persistent step:".yellow(),
            summary.skipped.join(", ")
        );
    }

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        format!(
            "All tasks completed successfully! ({} steps in {:.1}s)",
            summary.completed.len(),
            summary.elapsed.as_secs_f64()
        )
        .green()
        .bold()
    );

    Ok(())
}
