//! Primitive task actions
//!
//! An [`Action`] is what a primitive task does when it runs. Built-in actions
//! ([`ToolAction`]) read their options from the configuration store and hand
//! them to an external tool adapter; [`FnAction`] wraps a closure for tasks
//! defined in code.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use colored::*;
use tracing::{info, warn};

use crate::adapters::{ToolOutput, Toolbox};
use crate::cleanup;
use crate::configs::store::ConfigStore;
use crate::configs::tools::{ToolConfig, ToolKind};
use crate::types::{PipelineError, PipelineResult};

/// Everything a running step may read
pub struct TaskContext<'a> {
    pub task: &'a str,
    pub root: &'a Path,
    pub config: &'a ConfigStore,
    pub toolbox: &'a Toolbox,
    pub config_key: Option<&'a str>,
    pub default_config: Option<&'a ToolConfig>,
}

impl<'a> TaskContext<'a> {
    /// The step's options: its store entry, else its declared default
    pub fn options(&self) -> PipelineResult<&'a ToolConfig> {
        let key = self.config_key.unwrap_or(self.task);
        self.config.resolve(key, self.default_config)
    }
}

#[async_trait(?Send)]
pub trait Action {
    async fn run(&self, ctx: &TaskContext<'_>) -> PipelineResult<()>;

    /// Kind of options the action consumes. Pipelines reject a primitive whose
    /// store entry or default has a different kind.
    fn tool_kind(&self) -> Option<ToolKind> {
        None
    }
}

/// Action backed by a synchronous closure
pub struct FnAction<F> {
    func: F,
}

impl<F> FnAction<F>
where
    F: Fn(&TaskContext<'_>) -> PipelineResult<()>,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait(?Send)]
impl<F> Action for FnAction<F>
where
    F: Fn(&TaskContext<'_>) -> PipelineResult<()>,
{
    async fn run(&self, ctx: &TaskContext<'_>) -> PipelineResult<()> {
        (self.func)(ctx)
    }
}

/// Action dispatching to the toolbox adapter for its tool kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolAction(pub ToolKind);

#[async_trait(?Send)]
impl Action for ToolAction {
    async fn run(&self, ctx: &TaskContext<'_>) -> PipelineResult<()> {
        let options = ctx.options()?;
        let tools = ctx.toolbox;

        match self.0 {
            ToolKind::Compile => {
                let options = options.as_compiler()?;
                let output = tools.compiler.compile(options).await?;
                output.into_result("tsc")?;
            }
            ToolKind::Bundle => {
                let options = options.as_bundler()?;
                let output = tools.bundler.bundle(options).await?;
                output.into_result("r.js")?;
                info!(out = %options.out.display(), "bundle written");
            }
            ToolKind::Shell => run_shell(ctx, options).await?,
            ToolKind::Test => {
                let options = options.as_test_runner()?;
                let output = tools.test_runner.run(options).await?;
                output.into_result("karma")?;
            }
            ToolKind::Serve => {
                let options = options.as_server()?;
                let output = tools.server.start(options).await?;
                output.into_result("http-server")?;
            }
            ToolKind::Clean => {
                let options = options.as_clean()?;
                let report = cleanup::clean(ctx.root, &options.targets)?;
                for path in &report.removed {
                    println!("  {} {}", "removed".dimmed(), path.display());
                }
                info!(
                    removed = report.removed.len(),
                    missing = report.missing.len(),
                    skipped = report.skipped.len(),
                    "clean finished"
                );
            }
        }

        Ok(())
    }

    fn tool_kind(&self) -> Option<ToolKind> {
        Some(self.0)
    }
}

async fn run_shell(ctx: &TaskContext<'_>, options: &ToolConfig) -> PipelineResult<()> {
    let options = options.as_shell()?;
    let output: ToolOutput = ctx.toolbox.shell.run(options).await?;

    if !output.success && options.allow_failure {
        warn!(task = ctx.task, code = ?output.code, "command failed, continuing");
        return Ok(());
    }
    let output = output.into_result(&options.command.to_shell_line())?;

    if let Some(capture) = &options.capture {
        let path = ctx.root.join(capture);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        fs::write(&path, output.stdout.as_bytes()).map_err(|e| PipelineError::io(&path, e))?;
        info!(path = %path.display(), bytes = output.stdout.len(), "captured command output");
    }

    Ok(())
}
