use async_trait::async_trait;

use crate::adapters::{ProcessRunner, TestRunner, ToolOutput};
use crate::configs::tools::TestRunnerOptions;
use crate::types::PipelineResult;

/// Karma browser test runner from the tools directory
pub struct KarmaRunner {
    runner: ProcessRunner,
}

impl KarmaRunner {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }
}

pub fn karma_args(options: &TestRunnerOptions) -> Vec<String> {
    let mut args = vec![
        "start".to_string(),
        options.config_file.display().to_string(),
    ];
    if options.single_run {
        args.push("--single-run".to_string());
    }
    args
}

#[async_trait(?Send)]
impl TestRunner for KarmaRunner {
    async fn run(&self, options: &TestRunnerOptions) -> PipelineResult<ToolOutput> {
        let mut command = self.runner.tool("karma");
        command.args(karma_args(options));
        // Test progress goes straight to the terminal
        self.runner.attach(&mut command, "karma").await
    }
}
