//! Instrumented adapters that record invocations instead of launching tools

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use async_trait::async_trait;

use crate::adapters::{
    Bundler, Compiler, Server, ShellRunner, TestRunner, ToolOutput, Toolbox,
};
use crate::configs::tools::{
    BundlerOptions, CompilerOptions, ServerOptions, ShellOptions, TestRunnerOptions,
};
use crate::types::PipelineResult;

#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<String>>,
    failing: HashSet<&'static str>,
    stdout: String,
}

impl Recorder {
    fn record(&self, tool: &'static str, detail: String) -> PipelineResult<ToolOutput> {
        self.calls.borrow_mut().push(format!("{}:{}", tool, detail));
        if self.failing.contains(tool) {
            Ok(ToolOutput::failed(Some(1), format!("{} failed", tool)))
        } else {
            Ok(ToolOutput {
                stdout: self.stdout.clone(),
                ..ToolOutput::succeeded()
            })
        }
    }
}

/// Builds a [`Toolbox`] whose adapters log `"<tool>:<detail>"` per call
#[derive(Default)]
pub(crate) struct RecordingToolbox {
    recorder: Rc<Recorder>,
}

struct Recording(Rc<Recorder>);

impl RecordingToolbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every call to `tool` ("compile", "bundle", "shell", "test", "serve") fail
    pub(crate) fn failing(mut self, tool: &'static str) -> Self {
        if let Some(recorder) = Rc::get_mut(&mut self.recorder) {
            recorder.failing.insert(tool);
        }
        self
    }

    pub(crate) fn with_stdout(mut self, stdout: &str) -> Self {
        if let Some(recorder) = Rc::get_mut(&mut self.recorder) {
            recorder.stdout = stdout.to_string();
        }
        self
    }

    pub(crate) fn toolbox(&self) -> Toolbox {
        Toolbox {
            compiler: Box::new(Recording(self.recorder.clone())),
            bundler: Box::new(Recording(self.recorder.clone())),
            shell: Box::new(Recording(self.recorder.clone())),
            test_runner: Box::new(Recording(self.recorder.clone())),
            server: Box::new(Recording(self.recorder.clone())),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.recorder.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Compiler for Recording {
    async fn compile(&self, options: &CompilerOptions) -> PipelineResult<ToolOutput> {
        self.0.record("compile", options.out_dir.display().to_string())
    }
}

#[async_trait(?Send)]
impl Bundler for Recording {
    async fn bundle(&self, options: &BundlerOptions) -> PipelineResult<ToolOutput> {
        self.0.record("bundle", options.out.display().to_string())
    }
}

#[async_trait(?Send)]
impl ShellRunner for Recording {
    async fn run(&self, options: &ShellOptions) -> PipelineResult<ToolOutput> {
        self.0.record("shell", options.command.to_shell_line())
    }
}

#[async_trait(?Send)]
impl TestRunner for Recording {
    async fn run(&self, options: &TestRunnerOptions) -> PipelineResult<ToolOutput> {
        self.0.record("test", options.config_file.display().to_string())
    }
}

#[async_trait(?Send)]
impl Server for Recording {
    async fn start(&self, options: &ServerOptions) -> PipelineResult<ToolOutput> {
        self.0.record("serve", options.port.to_string())
    }
}
