use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use super::message::GenerationRequest;
use crate::domain::EngineError;

/// Stream of generated content chunks; a provider may fail at open or
/// mid-stream
pub type ContentStream = Pin<Box<dyn Stream<Item = Result<ContentChunk, EngineError>> + Send>>;

/// One chunk of streamed generation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Text content of this chunk
    pub content: String,

    /// Name of the provider that produced the chunk
    pub provider: String,

    /// Set on the synthetic chunk emitted when every provider failed
    #[serde(default)]
    pub degraded: bool,
}

impl ContentChunk {
    pub fn text(provider: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            provider: provider.into(),
            degraded: false,
        }
    }

    /// The degraded-success payload emitted when the fallback chain is
    /// exhausted; callers always receive a terminating, parseable response
    pub fn degraded() -> Self {
        Self {
            content: "Content generation is temporarily unavailable. Every configured \
                      provider failed; please try again shortly."
                .to_string(),
            provider: "fallback".to_string(),
            degraded: true,
        }
    }
}

/// A language-model backend candidate in the fallback chain.
///
/// Providers hold no per-run state; a provider instance is shared read-only
/// across concurrent runs.
#[async_trait]
pub trait ContentProvider: Send + Sync + Debug {
    /// Open a generation stream for the request
    async fn stream(&self, request: &GenerationRequest) -> Result<ContentStream, EngineError>;

    /// Stable provider name used for ordering and logging
    fn name(&self) -> &str;
}
