use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use crate::adapters::{Bundler, ProcessRunner, ToolOutput};
use crate::configs::tools::BundlerOptions;
use crate::types::{PipelineError, PipelineResult};

/// RequireJS optimizer (`r.js -o <build file>`) from the tools directory
pub struct RequireJsBundler {
    runner: ProcessRunner,
}

impl RequireJsBundler {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }
}

#[async_trait(?Send)]
impl Bundler for RequireJsBundler {
    async fn bundle(&self, options: &BundlerOptions) -> PipelineResult<ToolOutput> {
        let root = self.runner.root();
        let out = root.join(&options.out);
        let out_dir = out
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        std::fs::create_dir_all(&out_dir).map_err(|e| PipelineError::io(&out_dir, e))?;

        // Removed when dropped, after r.js exits
        let build_file = write_build_file(root, options)?;

        let mut command = self.runner.tool("r.js");
        command.arg("-o").arg(build_file.path());
        self.runner.capture(&mut command, "r.js", true).await
    }
}

/// Write the r.js build file to a temporary location outside the output tree
pub fn write_build_file(root: &Path, options: &BundlerOptions) -> PipelineResult<NamedTempFile> {
    let contents = serde_json::to_string_pretty(&build_manifest(root, options))
        .map_err(|e| PipelineError::Config(format!("cannot encode bundle manifest: {}", e)))?;

    let mut file = tempfile::Builder::new()
        .prefix("rjs-build-")
        .suffix(".json")
        .tempfile()
        .map_err(|e| PipelineError::io(std::env::temp_dir(), e))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| PipelineError::io(file.path(), e))?;
    Ok(file)
}

fn absolute(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| root.join(p).display().to_string())
        .collect()
}

/// r.js build file for `options`. Paths are made absolute because r.js
/// resolves them against the build file's own directory.
pub fn build_manifest(root: &Path, options: &BundlerOptions) -> Value {
    let shim: serde_json::Map<String, Value> = options
        .shim
        .iter()
        .map(|(module, shim)| (module.clone(), json!({ "exports": shim.exports })))
        .collect();

    json!({
        "baseUrl": root.join(&options.base_url).display().to_string(),
        "name": options.name,
        "include": options.include,
        "wrap": {
            "startFile": absolute(root, &options.wrap.start_file),
            "endFile": absolute(root, &options.wrap.end_file),
        },
        "out": root.join(&options.out).display().to_string(),
        "optimize": options.optimize,
        "generateSourceMaps": options.generate_source_maps,
        "preserveLicenseComments": options.preserve_license_comments,
        "shim": shim,
    })
}
