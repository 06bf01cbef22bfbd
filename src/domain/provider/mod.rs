//! Content provider domain models and traits

mod message;
mod provider;

pub use message::{ChatMessage, ChatRole, GenerationRequest};
pub use provider::{ContentChunk, ContentProvider, ContentStream};
