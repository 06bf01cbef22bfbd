//! Text generation driver
//!
//! Bridges the step contract to the provider fallback chain: builds a chat
//! request from the resolved parameters, drains the routed stream, and
//! returns the aggregated text as the step output.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio_stream::StreamExt;
use tracing::debug;

use crate::domain::{
    ChatMessage, Driver, DriverResult, ExecutionContext, GenerationRequest,
};
use crate::infrastructure::provider::ProviderRouter;

/// Generates text through the provider router.
///
/// Parameters: `prompt` (required), `system`, `temperature`, `max_tokens`.
#[derive(Debug)]
pub struct GenerateTextDriver {
    router: Arc<ProviderRouter>,
}

impl GenerateTextDriver {
    pub fn new(router: Arc<ProviderRouter>) -> Self {
        Self { router }
    }

    fn build_request(parameters: &Map<String, Value>) -> Option<GenerationRequest> {
        let prompt = parameters.get("prompt").and_then(Value::as_str)?;

        let mut messages = Vec::new();
        if let Some(system) = parameters.get("system").and_then(Value::as_str) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let mut request = GenerationRequest::new(messages);

        if let Some(temperature) = parameters.get("temperature").and_then(Value::as_f64) {
            request = request.with_temperature(temperature as f32);
        }

        if let Some(max_tokens) = parameters.get("max_tokens").and_then(Value::as_u64) {
            request = request.with_max_tokens(max_tokens as u32);
        }

        Some(request)
    }
}

#[async_trait]
impl Driver for GenerateTextDriver {
    async fn execute(
        &self,
        parameters: Map<String, Value>,
        context: &ExecutionContext,
    ) -> DriverResult {
        let Some(request) = Self::build_request(&parameters) else {
            return DriverResult::failed("missing required parameter 'prompt'");
        };

        let mut stream = match self.router.stream(&request).await {
            Ok(stream) => stream,
            Err(e) => return DriverResult::failed(e.to_string()),
        };

        let mut content = String::new();
        let mut provider = String::new();
        let mut degraded = false;

        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    content.push_str(&chunk.content);
                    provider = chunk.provider;
                    degraded |= chunk.degraded;
                }
                // The router absorbs provider failures; anything surfacing
                // here is already terminal
                Err(e) => return DriverResult::failed(e.to_string()),
            }
        }

        debug!(
            run_id = %context.run_id(),
            provider = %provider,
            degraded,
            chars = content.len(),
            "Generation complete"
        );

        let mut output = Map::new();
        output.insert("content".to_string(), json!(content));
        output.insert("provider".to_string(), json!(provider));
        output.insert("degraded".to_string(), json!(degraded));
        DriverResult::success(output)
    }
}
