use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Pipewright operations
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Task '{0}' not found")]
    NotFound(String),

    #[error("Missing configuration for task '{0}'")]
    MissingConfiguration(String),

    #[error("Task cycle detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed{}", format_diagnostics(.diagnostics))]
    ExternalTool {
        tool: String,
        diagnostics: Vec<String>,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task '{task}' stopped at step {stage}/{total} '{step}': {source}")]
    Step {
        task: String,
        step: String,
        stage: usize,
        total: usize,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap an `std::io::Error` with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The innermost error, unwrapping step context
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            Self::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Name of the primitive step that failed, if the error carries step context
    pub fn failing_step(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}

fn format_diagnostics(diagnostics: &[String]) -> String {
    if diagnostics.is_empty() {
        String::new()
    } else {
        format!(":\n  {}", diagnostics.join("\n  "))
    }
}

/// Result type alias for Pipewright operations
pub type PipelineResult<T> = Result<T, PipelineError>;
