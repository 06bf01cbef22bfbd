//! Workflow domain module
//!
//! The declarative workflow data model and the pieces of execution state that
//! carry no I/O: step documents, the run-scoped execution context, parameter
//! reference resolution, and the driver/run result contracts.
//!
//! ## Parameter references
//!
//! Step parameters reference earlier outputs with `{{stepId.key}}`; the
//! reserved `trigger` source addresses the trigger seed. Unresolved
//! references pass through literally.

mod context;
mod entity;
mod error;
pub mod resolver;
mod result;

pub use context::ExecutionContext;
pub use entity::{validate_step_id, Step, Workflow, MAX_STEP_ID_LENGTH};
pub use error::WorkflowError;
pub use result::{DriverResult, DriverStatus, RunResult, RunStatus};
