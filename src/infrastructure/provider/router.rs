//! Provider fallback router
//!
//! Routes a generation request across the configured providers: the default
//! provider first, then each fallback in declared order. Chunks are forwarded
//! to the caller as they arrive; when a provider fails at open or mid-stream
//! the router logs one warning and advances to the next candidate. When every
//! candidate fails the caller still receives a terminating response, a single
//! synthetic degraded chunk.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::domain::{ContentChunk, ContentProvider, ContentStream, EngineError, GenerationRequest};

const CHANNEL_CAPACITY: usize = 16;

/// Fallback chain over the configured content providers
#[derive(Debug)]
pub struct ProviderRouter {
    /// Candidates in routing order, default first
    candidates: Vec<Arc<dyn ContentProvider>>,
}

impl ProviderRouter {
    /// Build a router from the configured providers.
    ///
    /// `default_provider` names the first candidate; the remaining providers
    /// follow in the order given. A provider sharing the default's name is
    /// not considered twice.
    pub fn new(providers: Vec<Arc<dyn ContentProvider>>, default_provider: &str) -> Self {
        let mut candidates: Vec<Arc<dyn ContentProvider>> = Vec::with_capacity(providers.len());

        if let Some(default) = providers.iter().find(|p| p.name() == default_provider) {
            candidates.push(Arc::clone(default));
        }

        for provider in providers {
            if provider.name() != default_provider {
                candidates.push(provider);
            }
        }

        Self { candidates }
    }

    /// Names of the candidates in routing order
    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|p| p.name()).collect()
    }

    /// Stream a generation response through the fallback chain.
    ///
    /// Fails only when no provider is configured at all; provider failures
    /// are absorbed by falling back, and exhaustion degrades to a synthetic
    /// chunk rather than an error.
    pub async fn stream(&self, request: &GenerationRequest) -> Result<ContentStream, EngineError> {
        if self.candidates.is_empty() {
            return Err(EngineError::provider_unavailable(
                "no content providers configured",
            ));
        }

        let candidates = self.candidates.clone();
        let request = request.clone();
        let (tx, rx) = mpsc::channel::<Result<ContentChunk, EngineError>>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            for provider in &candidates {
                debug!(provider = %provider.name(), "Trying content provider");

                let mut stream = match provider.stream(&request).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!(
                            provider = %provider.name(),
                            error = %e,
                            "Provider failed to open stream, falling back"
                        );
                        continue;
                    }
                };

                let mut failed = false;

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(chunk) => {
                            if tx.send(Ok(chunk)).await.is_err() {
                                // Receiver dropped, nothing left to route
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(
                                provider = %provider.name(),
                                error = %e,
                                "Provider failed mid-stream, falling back"
                            );
                            failed = true;
                            break;
                        }
                    }
                }

                if !failed {
                    return;
                }
            }

            // Every candidate failed; terminate with a degraded chunk
            let _ = tx.send(Ok(ContentChunk::degraded())).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
