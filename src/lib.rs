//! Flowline - declarative workflow execution engine
//!
//! Workflows are JSON documents with a trigger, logic steps, and action
//! steps. Each step names a type that dispatches to a pluggable driver;
//! parameters reference earlier outputs with `{{stepId.key}}`. Text
//! generation steps route through a multi-provider fallback chain.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::EngineConfig;

use std::sync::Arc;

use domain::{ContentProvider, DriverRegistry, EngineError};
use infrastructure::drivers;
use infrastructure::provider::{ProviderRouter, SimulatedProvider};
use infrastructure::workflow::{RunnerConfig, WorkflowRunner};

/// Build a runner with the built-in drivers and the configured provider
/// chain.
///
/// Providers are simulated backends; real backends slot in through the same
/// [`ContentProvider`] contract.
pub fn create_runner(config: &EngineConfig) -> Result<WorkflowRunner, EngineError> {
    let providers: Vec<Arc<dyn ContentProvider>> = config
        .providers
        .provider_names()
        .into_iter()
        .map(|name| Arc::new(SimulatedProvider::echoing(name)) as Arc<dyn ContentProvider>)
        .collect();

    let router = Arc::new(ProviderRouter::new(
        providers,
        &config.providers.default_provider,
    ));

    let mut registry = DriverRegistry::new();
    drivers::register_builtin(&mut registry, router)?;

    let runner_config = RunnerConfig {
        max_steps: config.executor.max_steps,
    };

    Ok(WorkflowRunner::with_config(Arc::new(registry), runner_config))
}
