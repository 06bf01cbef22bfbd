//! Built-in action drivers

mod echo;
mod generate;

use std::sync::Arc;

pub use echo::EchoDriver;
pub use generate::GenerateTextDriver;

use crate::domain::{DriverRegistry, EngineError};
use crate::infrastructure::provider::ProviderRouter;
use crate::infrastructure::workflow::{ForEachDriver, IfElseDriver};

/// Register the built-in step types on a registry
pub fn register_builtin(
    registry: &mut DriverRegistry,
    router: Arc<ProviderRouter>,
) -> Result<(), EngineError> {
    registry.register("echo", Arc::new(EchoDriver))?;
    registry.register("generate_text", Arc::new(GenerateTextDriver::new(router)))?;
    registry.register_control_flow("if_else", Arc::new(IfElseDriver))?;
    registry.register_control_flow("for_each", Arc::new(ForEachDriver))?;
    Ok(())
}
