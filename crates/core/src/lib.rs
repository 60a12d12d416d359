//! Pipewright Core Library
//!
//! This is the core library for the Pipewright build orchestrator. It defines
//! named tasks, runs them in declared order and wires their configuration to
//! the external tools that do the actual work.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`pipeline`] - High-level interface: load a pipeline file, plan and run tasks
//! - [`registry`] - Named task table of primitive and composite tasks
//! - [`execution`] - Plan expansion, cycle detection and the sequential runner
//! - [`actions`] - What primitive tasks do when they run
//! - [`adapters`] - Compiler, bundler, shell, test runner and server boundaries
//! - [`cleanup`] - Recursive, idempotent filesystem removal
//! - [`configs`] - Pipeline file parsing and the per-task configuration store
//! - [`platform`] - Shell and tool naming per platform
//! - [`results`] - Result types for pipeline operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`Pipeline`]:
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
//! let summary = pipeline.run("test").await?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod adapters;
pub mod cleanup;
pub mod configs;
pub mod execution;
pub mod pipeline;
pub mod platform;
pub mod registry;
pub mod results;
pub mod types;

// Re-export the main types for easier usage
pub use pipeline::{Pipeline, PipelineOptions};
pub use types::{PipelineError, PipelineResult};
