use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::errors::ProviderError;
use crate::models::message::ChatMessage;

/// Raw body of a streamed completion, as it arrives from the network
pub type ByteStream = BoxStream<'static, Result<Bytes, ProviderError>>;

/// Sampling knobs for a single non-streamed completion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl CompletionOptions {
    pub fn new(temperature: Option<f32>, max_tokens: Option<i32>) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Base trait for chat-completion providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Start a streamed completion and hand back the undecoded event stream.
    ///
    /// Fails without streaming when the provider does not accept the request.
    async fn stream(&self, messages: &[ChatMessage]) -> Result<ByteStream, ProviderError>;

    /// Request a single completion and return the first choice's trimmed text
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, ProviderError>;
}
