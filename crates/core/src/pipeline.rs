//! High-level pipeline interface
//!
//! This module provides the [`Pipeline`] which serves as the primary interface
//! for all orchestration operations. It owns the task registry, the
//! configuration store and the tool adapters, all built once at startup.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pipewright_core::pipeline::{Pipeline, PipelineOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> pipewright_core::types::PipelineResult<()> {
//! let pipeline = Pipeline::load(PipelineOptions {
//!     workspace_root: PathBuf::from("."),
//!     config_path: None,
//! })?;
//!
//! // Show what a task would run
//! let plan = pipeline.plan("test")?;
//!
//! // Run it
//! pipeline.run("default").await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::actions::ToolAction;
use crate::adapters::Toolbox;
use crate::configs::pipeline::{parse_pipeline_config, PipelineConfig, TaskConfig, DEFAULT_PIPELINE};
use crate::configs::store::ConfigStore;
use crate::configs::tools::{ServerOptions, ToolConfig, ToolKind};
use crate::execution::{ExecutionPlan, TaskRunner};
use crate::registry::{Primitive, TaskDefinition, TaskKind, TaskRegistry};
use crate::results::{RunSummary, TaskInfo};
use crate::types::{PipelineError, PipelineResult};

/// File looked up in the workspace root when no config path is given
pub const PIPELINE_FILE_NAME: &str = "pipewright.yml";

/// Configuration for loading a pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub workspace_root: PathBuf,
    /// Explicit pipeline file; defaults to `pipewright.yml`, then the built-in pipeline
    pub config_path: Option<PathBuf>,
}

/// Where the pipeline definition came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineSource {
    File(PathBuf),
    BuiltIn,
}

pub struct Pipeline {
    pub name: Option<String>,
    pub source: PipelineSource,
    root: PathBuf,
    registry: TaskRegistry,
    config: ConfigStore,
    toolbox: Toolbox,
}

impl Pipeline {
    /// Load the pipeline file for a workspace and wire up process-backed tools
    pub fn load(options: PipelineOptions) -> PipelineResult<Self> {
        let (content, source) = Self::read_pipeline_file(&options)?;
        let config = parse_pipeline_config(&content).map_err(|e| {
            PipelineError::Config(format!("Failed to parse pipeline {}: {}", describe(&source), e))
        })?;

        let toolbox = Toolbox::process(&options.workspace_root, &config.tools_dir());
        let mut pipeline = Self::from_config(options.workspace_root, config, toolbox)?;
        pipeline.source = source;
        Ok(pipeline)
    }

    /// Build a pipeline from an already parsed definition
    pub fn from_config(root: PathBuf, config: PipelineConfig, toolbox: Toolbox) -> PipelineResult<Self> {
        let store: ConfigStore = config.config.into_iter().collect();
        let registry = build_registry(&config.tasks, &store)?;
        validate_registry(&registry, &store)?;
        info!(
            tasks = registry.len(),
            entries = store.len(),
            "pipeline loaded"
        );

        Ok(Self {
            name: config.name,
            source: PipelineSource::BuiltIn,
            root,
            registry,
            config: store,
            toolbox,
        })
    }

    /// Assemble a pipeline from parts constructed in code
    pub fn new(
        root: PathBuf,
        registry: TaskRegistry,
        config: ConfigStore,
        toolbox: Toolbox,
    ) -> PipelineResult<Self> {
        validate_registry(&registry, &config)?;
        Ok(Self {
            name: None,
            source: PipelineSource::BuiltIn,
            root,
            registry,
            config,
            toolbox,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Flattened steps of a task, without running anything
    pub fn plan(&self, task: &str) -> PipelineResult<ExecutionPlan> {
        self.runner().plan(task)
    }

    /// Run a task to completion or first failure
    pub async fn run(&self, task: &str) -> PipelineResult<RunSummary> {
        self.runner().run(task).await
    }

    /// Registered tasks in name order
    pub fn tasks(&self) -> Vec<TaskInfo> {
        self.registry.iter().map(TaskInfo::from).collect()
    }

    fn runner(&self) -> TaskRunner<'_> {
        TaskRunner::new(&self.registry, &self.config, &self.toolbox, &self.root)
    }

    fn read_pipeline_file(options: &PipelineOptions) -> PipelineResult<(String, PipelineSource)> {
        let path = match &options.config_path {
            Some(path) => Some(path.clone()),
            None => {
                let candidate = options.workspace_root.join(PIPELINE_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "reading pipeline file");
                let content =
                    std::fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
                Ok((content, PipelineSource::File(path)))
            }
            None => {
                debug!("no pipeline file, using the built-in pipeline");
                Ok((DEFAULT_PIPELINE.to_string(), PipelineSource::BuiltIn))
            }
        }
    }
}

fn describe(source: &PipelineSource) -> String {
    match source {
        PipelineSource::File(path) => path.display().to_string(),
        PipelineSource::BuiltIn => "(built-in)".to_string(),
    }
}

/// Options a tool kind falls back to when the pipeline file has no entry
fn builtin_default(kind: ToolKind) -> Option<ToolConfig> {
    match kind {
        ToolKind::Serve => Some(ToolConfig::Serve(ServerOptions::default())),
        _ => None,
    }
}

/// Whether options describe a tool run that does not end on its own
fn runs_forever(config: &ToolConfig) -> bool {
    match config {
        ToolConfig::Compile(options) => options.watch.is_some(),
        ToolConfig::Serve(options) => options.keepalive,
        _ => false,
    }
}

/// Turn task entries into a registry. Option kinds are checked by [`validate_registry`].
pub fn build_registry(tasks: &[TaskConfig], store: &ConfigStore) -> PipelineResult<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    for task in tasks {
        let definition = match (&task.action, &task.steps) {
            (Some(kind), None) => {
                TaskDefinition::primitive(&task.name, build_primitive(task, *kind, store))
            }
            (None, Some(steps)) => TaskDefinition::composite(&task.name, steps.iter().cloned()),
            (Some(_), Some(_)) => {
                return Err(PipelineError::Config(format!(
                    "Task '{}' sets both 'action' and 'steps'",
                    task.name
                )))
            }
            (None, None) => {
                return Err(PipelineError::Config(format!(
                    "Task '{}' needs either 'action' or 'steps'",
                    task.name
                )))
            }
        };

        let definition = match &task.description {
            Some(description) => definition.describe(description),
            None => definition,
        };
        registry.register(definition);
    }

    Ok(registry)
}

/// Check that every tool-backed primitive's options match the tool it drives
pub fn validate_registry(registry: &TaskRegistry, store: &ConfigStore) -> PipelineResult<()> {
    for task in registry.iter() {
        let TaskKind::Primitive(primitive) = &task.kind else {
            continue;
        };
        let Some(kind) = primitive.action.tool_kind() else {
            continue;
        };

        let check = |config: &ToolConfig, origin: &str| {
            if config.kind() == kind {
                Ok(())
            } else {
                Err(PipelineError::Config(format!(
                    "Task '{}' runs '{}' but its {} is '{}' options",
                    task.name,
                    kind,
                    origin,
                    config.kind()
                )))
            }
        };

        if let Some(default) = &primitive.default_config {
            check(default, "default")?;
        }
        if let Some(key) = &primitive.config_key {
            if let Ok(entry) = store.get(key) {
                check(entry, &format!("configuration '{}'", key))?;
            }
        }
    }

    Ok(())
}

fn build_primitive(task: &TaskConfig, kind: ToolKind, store: &ConfigStore) -> Primitive {
    let key = task.config.clone().unwrap_or_else(|| task.name.clone());
    let default = task.default.clone().or_else(|| builtin_default(kind));

    let entry = store.get(&key).ok();
    let persistent = task
        .persistent
        .unwrap_or_else(|| entry.or(default.as_ref()).is_some_and(runs_forever));

    let primitive = Primitive::new(ToolAction(kind))
        .with_config(key)
        .persistent(persistent);
    match default {
        Some(default) => primitive.with_default(default),
        None => primitive,
    }
}
