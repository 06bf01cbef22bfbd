//! Workflow execution infrastructure

mod control_flow;
mod runner;

pub use control_flow::{evaluate_condition, ForEachDriver, IfElseDriver};
pub use runner::{RunnerConfig, WorkflowRunner};
