//! Driver registry
//!
//! Owns the mapping from step type keys to driver instances. The registry is
//! built once at startup, before any run dispatches through it, and is then
//! shared read-only behind an `Arc` for the lifetime of the engine process.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::{ControlFlowDriver, Driver};
use crate::domain::EngineError;

/// A registered driver, distinguished by dispatch shape
#[derive(Debug, Clone)]
pub enum RegisteredDriver {
    /// Performs an external effect
    Action(Arc<dyn Driver>),

    /// Recurses into nested step lists via the executor
    ControlFlow(Arc<dyn ControlFlowDriver>),
}

/// Maps step type keys to driver instances
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, RegisteredDriver>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Register an action driver for a step type.
    ///
    /// Fails at registration time if the type is already bound, so integration
    /// conflicts surface at startup rather than mid-run.
    pub fn register(
        &mut self,
        step_type: impl Into<String>,
        driver: Arc<dyn Driver>,
    ) -> Result<(), EngineError> {
        self.insert(step_type.into(), RegisteredDriver::Action(driver))
    }

    /// Register a control-flow driver for a step type
    pub fn register_control_flow(
        &mut self,
        step_type: impl Into<String>,
        driver: Arc<dyn ControlFlowDriver>,
    ) -> Result<(), EngineError> {
        self.insert(step_type.into(), RegisteredDriver::ControlFlow(driver))
    }

    fn insert(&mut self, step_type: String, driver: RegisteredDriver) -> Result<(), EngineError> {
        if self.drivers.contains_key(&step_type) {
            return Err(EngineError::driver_conflict(step_type));
        }

        info!(step_type = %step_type, "Registering driver");
        self.drivers.insert(step_type, driver);
        Ok(())
    }

    /// Resolve the driver bound to a step type.
    ///
    /// An unbound type is a fatal, non-retryable run error.
    pub fn resolve(&self, step_type: &str) -> Result<&RegisteredDriver, EngineError> {
        self.drivers
            .get(step_type)
            .ok_or_else(|| EngineError::unknown_step_type(step_type))
    }

    pub fn contains(&self, step_type: &str) -> bool {
        self.drivers.contains_key(step_type)
    }

    /// All registered step type keys
    pub fn step_types(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }
}
