//! Completion Service connector module
//!
//! Wraps the provider's streaming chat completion API behind a trait so the
//! conversation orchestrator never depends on HTTP details.

use super::config::CompletionServiceConfig;
use super::errors::ConnectorError;
use crate::models::MessageContent;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub mod mock;
mod sse;

pub use client::OpenAiCompletionClient;

/// Lazy, finite, non-restartable sequence of generated text fragments.
///
/// Dropping the stream releases the underlying provider connection.
pub type FragmentStream = BoxStream<'static, Result<String, ConnectorError>>;

#[async_trait]
pub trait CompletionConnector: Send + Sync {
    /// Open a streaming completion for the given context window.
    async fn stream_completion(
        &self,
        context: Vec<MessageContent>,
        model_version: &str,
    ) -> Result<FragmentStream, ConnectorError>;
}

/// Initialize the completion connector from settings
pub fn init(config: &CompletionServiceConfig) -> Result<Arc<dyn CompletionConnector>, ConnectorError> {
    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set, completion requests will be sent unauthenticated");
    }
    tracing::info!("Initializing completion connector: {}", config.base_url);
    let client = OpenAiCompletionClient::new(config.clone())?;
    Ok(Arc::new(client))
}
