//! Language model invocation trait — an external collaborator contract.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::{ChatResponse, Prompt, Result};

/// A lazy, ordered, finite sequence of response fragments from a streaming
/// model invocation. The terminal fragment carries a finish reason.
pub type ChatResponseStream = Pin<Box<dyn Stream<Item = Result<ChatResponse>> + Send>>;

/// Invokes a language model with a prompt.
///
/// This is the terminal collaborator of the advisor chain and the model
/// used by LLM-backed query transformers. Implementations wrap a provider
/// API; this core imposes no timeout of its own and never masks a
/// collaborator's error.
///
/// # Examples
///
/// ```rust,no_run
/// use ragweave_core::traits::{ChatModel, ChatResponseStream};
/// use ragweave_core::{ChatResponse, FinishReason, Prompt, Result};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct EchoModel;
///
/// #[async_trait]
/// impl ChatModel for EchoModel {
///     async fn call(&self, prompt: &Prompt) -> Result<ChatResponse> {
///         Ok(ChatResponse::new(prompt.user_text().to_string())
///             .with_finish_reason(FinishReason::Stop))
///     }
///
///     async fn stream(&self, prompt: &Prompt) -> Result<ChatResponseStream> {
///         let response = self.call(prompt).await?;
///         Ok(Box::pin(futures::stream::once(async move { Ok(response) })))
///     }
/// }
/// ```
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    /// Invoke the model once and wait for the complete response.
    ///
    /// # Errors
    ///
    /// Returns a model error if the invocation fails.
    async fn call(&self, prompt: &Prompt) -> Result<ChatResponse>;

    /// Invoke the model and receive the response as a lazy fragment stream.
    ///
    /// The stream is finite and restartable only by re-invoking the model;
    /// a well-behaved implementation marks exactly its last fragment with a
    /// finish reason.
    ///
    /// # Errors
    ///
    /// Returns a model error if the invocation cannot be started. Failures
    /// mid-stream surface as `Err` items on the stream itself.
    async fn stream(&self, prompt: &Prompt) -> Result<ChatResponseStream>;

    /// Get a human-readable name for this model.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
