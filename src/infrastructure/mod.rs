//! Infrastructure layer - executor, drivers, providers, logging

pub mod drivers;
pub mod logging;
pub mod provider;
pub mod workflow;
