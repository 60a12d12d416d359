use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use pipewright_core::pipeline::{Pipeline, PipelineOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

/// Pipewright - A build pipeline orchestrator
#[derive(Parser)]
#[command(name = "pipewright")]
#[command(about = "Run named build tasks in declared order")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Pipeline file (defaults to <workspace>/pipewright.yml, then the built-in pipeline)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task
    Run {
        /// Task name
        #[arg(default_value = "default")]
        task: String,
    },
    /// Show the steps a task would run without running them
    Plan {
        /// Task name
        task: String,
    },
    /// List registered tasks
    List,
    /// Print the JSON schema of the pipeline file
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "pipewright=debug,pipewright_core=debug"
    } else {
        "pipewright=warn,pipewright_core=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    // Load the pipeline definition and tool adapters once
    let pipeline = Pipeline::load(PipelineOptions {
        workspace_root: cli.workspace,
        config_path: cli.config,
    })
    .map_err(|e| anyhow::anyhow!("Failed to load pipeline: {}", e))?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::Run { task } => commands::run::execute(&pipeline, &task).await,
        Commands::Plan { task } => commands::plan::execute(&pipeline, &task),
        Commands::List => commands::list::execute(&pipeline),
        Commands::Schema => commands::schema::execute(),
    }
}
