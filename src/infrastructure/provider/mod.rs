//! Content provider implementations and routing

mod router;
mod simulated;

pub use router::ProviderRouter;
pub use simulated::{SimulatedFailure, SimulatedProvider};
