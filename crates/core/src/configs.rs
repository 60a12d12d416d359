//! Pipeline file parsing and per-task tool configuration

pub mod pipeline;
pub mod store;
pub mod tools;

pub use pipeline::{parse_pipeline_config, PipelineConfig, TaskConfig, DEFAULT_PIPELINE};
pub use store::ConfigStore;
pub use tools::{ToolConfig, ToolKind};
