//! Process launching shared by the tool adapters
//!
//! Every external tool runs with the workspace root as its working directory
//! and with the local tools directory prepended to `PATH`, so executables are
//! found there before anything installed globally.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::adapters::ToolOutput;
use crate::platform::PlatformInfo;
use crate::types::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
pub struct ProcessRunner {
    root: PathBuf,
    tools_dir: PathBuf,
    platform: PlatformInfo,
}

impl ProcessRunner {
    /// `tools_dir` is resolved against `root` when relative
    pub fn new(root: &Path, tools_dir: &Path) -> Self {
        let tools_dir = if tools_dir.is_relative() {
            root.join(tools_dir)
        } else {
            tools_dir.to_path_buf()
        };
        Self {
            root: root.to_path_buf(),
            tools_dir,
            platform: PlatformInfo::current(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a tool executable inside the tools directory
    pub fn tool_path(&self, tool: &str) -> PathBuf {
        self.tools_dir.join(self.platform.executable_name(tool))
    }

    /// Command for a tool from the tools directory
    pub fn tool(&self, tool: &str) -> Command {
        self.prepare(Command::new(self.tool_path(tool)))
    }

    /// Command that runs `line` through the platform shell
    pub fn shell(&self, line: &str) -> Command {
        let mut command = Command::new(self.platform.shell);
        command.arg(self.platform.shell_flag).arg(line);
        self.prepare(command)
    }

    fn prepare(&self, mut command: Command) -> Command {
        command.current_dir(&self.root);
        if let Some(path) = self.search_path() {
            command.env("PATH", path);
        }
        command
    }

    fn search_path(&self) -> Option<OsString> {
        let mut paths = vec![self.tools_dir.clone()];
        if let Some(existing) = env::var_os("PATH") {
            paths.extend(env::split_paths(&existing));
        }
        env::join_paths(paths).ok()
    }

    /// Run to completion with output captured, then replay it to the terminal
    pub async fn capture(
        &self,
        command: &mut Command,
        label: &str,
        echo_stdout: bool,
    ) -> PipelineResult<ToolOutput> {
        debug!(tool = label, "running with captured output");
        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| launch_error(label, e))?;

        let result = ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if echo_stdout && !result.stdout.is_empty() {
            print!("{}", result.stdout);
        }
        if !result.stderr.is_empty() {
            eprint!("{}", result.stderr);
        }

        Ok(result)
    }

    /// Run to completion with the terminal attached; nothing is captured
    pub async fn attach(&self, command: &mut Command, label: &str) -> PipelineResult<ToolOutput> {
        debug!(tool = label, "running attached to the terminal");
        let status = command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| launch_error(label, e))?;

        Ok(ToolOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    /// Start in the background; the child is killed when its handle is dropped
    pub fn spawn(&self, command: &mut Command, label: &str) -> PipelineResult<Child> {
        debug!(tool = label, "spawning background process");
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| launch_error(label, e))
    }
}

fn launch_error(label: &str, error: std::io::Error) -> PipelineError {
    PipelineError::ExternalTool {
        tool: label.to_string(),
        diagnostics: vec![format!("failed to launch: {}", error)],
    }
}
