use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::info;

use crate::adapters::{Compiler, ProcessRunner, ToolOutput};
use crate::configs::tools::CompilerOptions;
use crate::types::{PipelineError, PipelineResult};

const EXCLUDE_GLOBS: &[&str] = &["**/.git/**", "**/target/**", "**/node_modules/**"];

/// TypeScript compiler (`tsc`) from the tools directory
pub struct TscCompiler {
    runner: ProcessRunner,
}

impl TscCompiler {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }
}

#[async_trait(?Send)]
impl Compiler for TscCompiler {
    async fn compile(&self, options: &CompilerOptions) -> PipelineResult<ToolOutput> {
        let sources = expand_sources(self.runner.root(), &options.src)?;
        if sources.is_empty() {
            return Ok(ToolOutput::failed(
                None,
                format!("no source files match {}", options.src.join(", ")),
            ));
        }
        info!(files = sources.len(), out_dir = %options.out_dir.display(), "compiling");

        let mut command = self.runner.tool("tsc");
        command.args(compiler_args(options)).args(&sources);

        if options.watch.is_some() {
            self.runner.attach(&mut command, "tsc").await
        } else {
            self.runner.capture(&mut command, "tsc", true).await
        }
    }
}

/// Command-line flags for `options`, without the source list
pub fn compiler_args(options: &CompilerOptions) -> Vec<String> {
    let mut args = vec![
        "--outDir".to_string(),
        options.out_dir.display().to_string(),
        "--module".to_string(),
        options.module.clone(),
    ];
    if options.source_map {
        args.push("--sourceMap".to_string());
    }
    if options.declaration {
        args.push("--declaration".to_string());
    }
    if !options.comments {
        args.push("--removeComments".to_string());
    }
    if options.watch.is_some() {
        args.push("--watch".to_string());
    }
    args
}

fn build_glob_set(patterns: &[&str]) -> PipelineResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| PipelineError::Config(format!("invalid glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| PipelineError::Config(format!("invalid glob set: {}", e)))
}

/// Files under `root` matching any of `patterns`, relative to `root` and sorted
pub fn expand_sources(root: &Path, patterns: &[String]) -> PipelineResult<Vec<PathBuf>> {
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
    let include_set = build_glob_set(&patterns)?;
    let exclude_set = build_glob_set(EXCLUDE_GLOBS)?;

    let mut sources = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current_dir) = queue.pop_front() {
        let entries = std::fs::read_dir(&current_dir)
            .map_err(|e| PipelineError::io(&current_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(&current_dir, e))?;
            let path = entry.path();
            let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

            if exclude_set.is_match(&relative_path) {
                continue;
            }

            let file_type = entry.file_type().map_err(|e| PipelineError::io(&path, e))?;
            if file_type.is_dir() {
                queue.push_back(path);
            } else if include_set.is_match(&relative_path) {
                sources.push(relative_path);
            }
        }
    }

    sources.sort();
    Ok(sources)
}
