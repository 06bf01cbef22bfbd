//! Driver contracts
//!
//! A driver is the pluggable handler behind a step type. Action drivers
//! perform an external effect and report back through [`DriverResult`];
//! control-flow drivers additionally receive a narrow [`ScopeRunner`]
//! capability so branch and loop bodies recurse through the executor without
//! the driver owning a reference to the whole engine.

mod registry;

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::workflow::{DriverResult, ExecutionContext, Step, WorkflowError};

pub use registry::{DriverRegistry, RegisteredDriver};

/// Uniform capability contract implemented by every integration adapter.
///
/// `parameters` arrive with references already resolved; the context carries
/// the accumulated run data and the run/user identifiers. A driver reports
/// failure through the returned [`DriverResult`], never by panicking, and is
/// responsible for its own retry policy and timeouts.
#[async_trait]
pub trait Driver: Send + Sync + Debug {
    async fn execute(
        &self,
        parameters: Map<String, Value>,
        context: &ExecutionContext,
    ) -> DriverResult;
}

/// Capability handed to control-flow drivers: run a nested step list against
/// a context. This is the only surface of the executor a driver can reach.
#[async_trait]
pub trait ScopeRunner: Send + Sync {
    async fn run_scope(
        &self,
        steps: &[Step],
        context: &mut ExecutionContext,
    ) -> Result<(), WorkflowError>;
}

/// Contract for control-flow step types (conditional, loop).
///
/// These receive the raw step (for its nested lists and condition) plus the
/// scope-runner handle, and recurse through the executor rather than
/// performing external effects themselves.
#[async_trait]
pub trait ControlFlowDriver: Send + Sync + Debug {
    async fn execute(
        &self,
        step: &Step,
        context: &mut ExecutionContext,
        scope: &dyn ScopeRunner,
    ) -> Result<DriverResult, WorkflowError>;
}
