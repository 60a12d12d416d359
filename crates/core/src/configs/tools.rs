use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cleanup::CleanTarget;
use crate::types::{PipelineError, PipelineResult};

/// Options for one primitive task, tagged by the kind of tool that consumes them
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToolConfig {
    Compile(CompilerOptions),
    Bundle(BundlerOptions),
    Shell(ShellOptions),
    Test(TestRunnerOptions),
    Serve(ServerOptions),
    Clean(CleanOptions),
}

/// Which tool kind a [`ToolConfig`] is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    Compile,
    Bundle,
    Shell,
    Test,
    Serve,
    Clean,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ToolKind::Compile => "compile",
            ToolKind::Bundle => "bundle",
            ToolKind::Shell => "shell",
            ToolKind::Test => "test",
            ToolKind::Serve => "serve",
            ToolKind::Clean => "clean",
        };
        f.write_str(name)
    }
}

impl ToolConfig {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolConfig::Compile(_) => ToolKind::Compile,
            ToolConfig::Bundle(_) => ToolKind::Bundle,
            ToolConfig::Shell(_) => ToolKind::Shell,
            ToolConfig::Test(_) => ToolKind::Test,
            ToolConfig::Serve(_) => ToolKind::Serve,
            ToolConfig::Clean(_) => ToolKind::Clean,
        }
    }

    pub fn as_compiler(&self) -> PipelineResult<&CompilerOptions> {
        match self {
            ToolConfig::Compile(options) => Ok(options),
            other => Err(other.mismatch(ToolKind::Compile)),
        }
    }

    pub fn as_bundler(&self) -> PipelineResult<&BundlerOptions> {
        match self {
            ToolConfig::Bundle(options) => Ok(options),
            other => Err(other.mismatch(ToolKind::Bundle)),
        }
    }

    pub fn as_shell(&self) -> PipelineResult<&ShellOptions> {
        match self {
            ToolConfig::Shell(options) => Ok(options),
            other => Err(other.mismatch(ToolKind::Shell)),
        }
    }

    pub fn as_test_runner(&self) -> PipelineResult<&TestRunnerOptions> {
        match self {
            ToolConfig::Test(options) => Ok(options),
            other => Err(other.mismatch(ToolKind::Test)),
        }
    }

    pub fn as_server(&self) -> PipelineResult<&ServerOptions> {
        match self {
            ToolConfig::Serve(options) => Ok(options),
            other => Err(other.mismatch(ToolKind::Serve)),
        }
    }

    pub fn as_clean(&self) -> PipelineResult<&CleanOptions> {
        match self {
            ToolConfig::Clean(options) => Ok(options),
            other => Err(other.mismatch(ToolKind::Clean)),
        }
    }

    fn mismatch(&self, expected: ToolKind) -> PipelineError {
        PipelineError::Config(format!(
            "expected '{}' options but found '{}'",
            expected,
            self.kind()
        ))
    }
}

fn default_true() -> bool {
    true
}

fn default_module() -> String {
    "amd".to_string()
}

/// TypeScript compiler invocation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerOptions {
    /// Glob patterns of source files, relative to the workspace root.
    pub src: Vec<String>,
    pub out_dir: PathBuf,
    #[serde(default = "default_true")]
    pub source_map: bool,
    #[serde(default = "default_module")]
    pub module: String,
    /// Keep comments in the emitted JavaScript.
    #[serde(default = "default_true")]
    pub comments: bool,
    #[serde(default = "default_true")]
    pub declaration: bool,
    /// Directory to watch; turns the compile into a non-terminating task.
    pub watch: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Optimize {
    #[default]
    None,
    Uglify,
    Uglify2,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WrapOptions {
    #[serde(default)]
    pub start_file: Vec<PathBuf>,
    #[serde(default)]
    pub end_file: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShimOptions {
    pub exports: String,
}

/// AMD bundler (r.js) invocation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
    /// Directory holding the compiled modules.
    pub base_url: PathBuf,
    /// Entry module, relative to `base_url`.
    pub name: String,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub wrap: WrapOptions,
    pub out: PathBuf,
    #[serde(default)]
    pub optimize: Optimize,
    #[serde(default)]
    pub generate_source_maps: bool,
    #[serde(default = "default_true")]
    pub preserve_license_comments: bool,
    #[serde(default)]
    pub shim: BTreeMap<String, ShimOptions>,
}

/// A shell command, either a single line or a list of steps joined with `&&`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

impl Command {
    pub fn to_shell_line(&self) -> String {
        match self {
            Command::Single(line) => line.clone(),
            Command::Multiple(steps) => steps.join(" && "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShellOptions {
    pub command: Command,
    /// File that receives the command's stdout verbatim.
    pub capture: Option<PathBuf>,
    /// Treat a failing command as success.
    #[serde(default)]
    pub allow_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestRunnerOptions {
    pub config_file: PathBuf,
    #[serde(default = "default_true")]
    pub single_run: bool,
}

fn default_port() -> u16 {
    8000
}

fn default_base() -> PathBuf {
    PathBuf::from(".")
}

/// Static file server used by the browser tests
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerOptions {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_base")]
    pub base: PathBuf,
    /// Block until the server exits instead of serving in the background.
    #[serde(default)]
    pub keepalive: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: default_port(),
            base: default_base(),
            keepalive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CleanOptions {
    pub targets: Vec<CleanTarget>,
}
