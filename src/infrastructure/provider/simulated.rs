//! Simulated content provider
//!
//! A full [`ContentProvider`] implementation that streams canned text. Used
//! for local runs without real backend credentials and as the failure
//! injection point in router tests. Not a special case in the router; it
//! participates in the fallback chain like any other provider.

use async_trait::async_trait;

use crate::domain::{
    ChatRole, ContentChunk, ContentProvider, ContentStream, EngineError, GenerationRequest,
};

/// Failure injected into a simulated stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedFailure {
    /// Fail before the stream opens
    OnOpen,

    /// Open successfully, then fail after yielding this many chunks
    AfterChunks(usize),
}

/// Streams canned content in fixed-size chunks
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    name: String,

    /// Canned reply; when empty the provider echoes the last user message
    script: String,

    /// Characters per emitted chunk
    chunk_size: usize,

    failure: Option<SimulatedFailure>,
}

impl SimulatedProvider {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            chunk_size: 24,
            failure: None,
        }
    }

    /// Provider that echoes the last user message back
    pub fn echoing(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_failure(mut self, failure: SimulatedFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    fn reply_for(&self, request: &GenerationRequest) -> String {
        if !self.script.is_empty() {
            return self.script.clone();
        }

        let prompt = request.last_user_content().unwrap_or("");
        let system = request
            .messages
            .iter()
            .any(|m| m.role == ChatRole::System);

        if system {
            format!("[simulated] {}", prompt)
        } else {
            prompt.to_string()
        }
    }
}

#[async_trait]
impl ContentProvider for SimulatedProvider {
    async fn stream(&self, request: &GenerationRequest) -> Result<ContentStream, EngineError> {
        if self.failure == Some(SimulatedFailure::OnOpen) {
            return Err(EngineError::provider(&self.name, "simulated open failure"));
        }

        let reply = self.reply_for(request);
        let chars: Vec<char> = reply.chars().collect();

        let mut items: Vec<Result<ContentChunk, EngineError>> = chars
            .chunks(self.chunk_size)
            .map(|chunk| Ok(ContentChunk::text(&self.name, chunk.iter().collect::<String>())))
            .collect();

        if let Some(SimulatedFailure::AfterChunks(n)) = self.failure {
            items.truncate(n);
            items.push(Err(EngineError::provider(
                &self.name,
                "simulated mid-stream failure",
            )));
        }

        Ok(Box::pin(tokio_stream::iter(items)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
