//! Task execution module
//!
//! This module expands tasks into execution plans and runs them step by step.

pub mod plan;
pub mod runner;

pub use plan::{resolve_execution_plan, ExecutionPlan, PlannedStep};
pub use runner::TaskRunner;
