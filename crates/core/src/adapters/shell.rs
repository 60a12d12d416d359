use async_trait::async_trait;

use crate::adapters::{ProcessRunner, ShellRunner, ToolOutput};
use crate::configs::tools::ShellOptions;
use crate::types::PipelineResult;

/// Runs command lines through `sh -c` (`cmd /C` on Windows)
pub struct SystemShell {
    runner: ProcessRunner,
}

impl SystemShell {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }
}

#[async_trait(?Send)]
impl ShellRunner for SystemShell {
    async fn run(&self, options: &ShellOptions) -> PipelineResult<ToolOutput> {
        let line = options.command.to_shell_line();
        let mut command = self.runner.shell(&line);
        // Captured stdout is written to a file, not the terminal
        let echo_stdout = options.capture.is_none();
        self.runner.capture(&mut command, &line, echo_stdout).await
    }
}
