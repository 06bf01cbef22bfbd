//! Domain layer - data model and trait seams, no I/O

pub mod driver;
pub mod error;
pub mod provider;
pub mod workflow;

pub use driver::{ControlFlowDriver, Driver, DriverRegistry, RegisteredDriver, ScopeRunner};
pub use error::EngineError;
pub use provider::{ChatMessage, ChatRole, ContentChunk, ContentProvider, ContentStream, GenerationRequest};
pub use workflow::{
    DriverResult, DriverStatus, ExecutionContext, RunResult, RunStatus, Step, Workflow,
    WorkflowError,
};
