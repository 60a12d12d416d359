//! External tool adapters
//!
//! The compiler, bundler, shell, test runner and file server are opaque
//! collaborators. Each sits behind a trait taking its typed options and
//! returning a [`ToolOutput`]; the process-backed implementations launch the
//! tools from the workspace's local tools directory.

pub mod bundler;
pub mod compiler;
pub mod process;
pub mod server;
pub mod shell;
pub mod test_runner;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use async_trait::async_trait;

use crate::configs::tools::{
    BundlerOptions, CompilerOptions, ServerOptions, ShellOptions, TestRunnerOptions,
};
use crate::types::{PipelineError, PipelineResult};

pub use process::ProcessRunner;

/// What an external tool reported when it finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failed(code: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            stdout: String::new(),
            stderr: diagnostics.into(),
        }
    }

    /// Non-empty output lines, stderr first; the exit code when there are none
    pub fn diagnostics(&self) -> Vec<String> {
        let lines: Vec<String> = self
            .stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect();

        if lines.is_empty() {
            match self.code {
                Some(code) => vec![format!("exited with status {}", code)],
                None => vec!["terminated by signal".to_string()],
            }
        } else {
            lines
        }
    }

    /// Turn a failed run into [`PipelineError::ExternalTool`]
    pub fn into_result(self, tool: &str) -> PipelineResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(PipelineError::ExternalTool {
                tool: tool.to_string(),
                diagnostics: self.diagnostics(),
            })
        }
    }
}

#[async_trait(?Send)]
pub trait Compiler {
    async fn compile(&self, options: &CompilerOptions) -> PipelineResult<ToolOutput>;
}

#[async_trait(?Send)]
pub trait Bundler {
    async fn bundle(&self, options: &BundlerOptions) -> PipelineResult<ToolOutput>;
}

#[async_trait(?Send)]
pub trait ShellRunner {
    async fn run(&self, options: &ShellOptions) -> PipelineResult<ToolOutput>;
}

#[async_trait(?Send)]
pub trait TestRunner {
    async fn run(&self, options: &TestRunnerOptions) -> PipelineResult<ToolOutput>;
}

#[async_trait(?Send)]
pub trait Server {
    /// Start serving. Returns once the server is up, or when it exits if `keepalive` is set.
    async fn start(&self, options: &ServerOptions) -> PipelineResult<ToolOutput>;
}

/// The set of adapters a pipeline runs with
pub struct Toolbox {
    pub compiler: Box<dyn Compiler>,
    pub bundler: Box<dyn Bundler>,
    pub shell: Box<dyn ShellRunner>,
    pub test_runner: Box<dyn TestRunner>,
    pub server: Box<dyn Server>,
}

impl Toolbox {
    /// Adapters that launch real processes from `tools_dir`
    pub fn process(root: &Path, tools_dir: &Path) -> Self {
        let runner = ProcessRunner::new(root, tools_dir);
        Self {
            compiler: Box::new(compiler::TscCompiler::new(runner.clone())),
            bundler: Box::new(bundler::RequireJsBundler::new(runner.clone())),
            shell: Box::new(shell::SystemShell::new(runner.clone())),
            test_runner: Box::new(test_runner::KarmaRunner::new(runner.clone())),
            server: Box::new(server::HttpServer::new(runner)),
        }
    }
}
