//! Echo driver
//!
//! Reference implementation of the driver contract: returns its resolved
//! parameters as the step output. Useful for wiring checks and for workflows
//! that only reshape run data.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{Driver, DriverResult, ExecutionContext};

#[derive(Debug, Default)]
pub struct EchoDriver;

#[async_trait]
impl Driver for EchoDriver {
    async fn execute(
        &self,
        parameters: Map<String, Value>,
        context: &ExecutionContext,
    ) -> DriverResult {
        debug!(run_id = %context.run_id(), keys = parameters.len(), "Echoing parameters");
        DriverResult::success(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_echo_returns_parameters() {
        let mut parameters = Map::new();
        parameters.insert("message".to_string(), json!("hello"));
        parameters.insert("count".to_string(), json!(3));

        let context = ExecutionContext::new("user-1");
        let result = EchoDriver.execute(parameters.clone(), &context).await;

        assert!(!result.is_failed());
        assert_eq!(result.output, parameters);
    }
}
