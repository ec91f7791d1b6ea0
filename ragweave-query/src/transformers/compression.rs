//! Conversation compression transformer.

use std::sync::Arc;

use async_trait::async_trait;
use ragweave_core::{
    ChatModel, ChatTurn, Prompt, PromptTemplate, Query, QueryTransformer, RagweaveError, Result,
};
use tracing::debug;

const DEFAULT_COMPRESSION_TEMPLATE: &str = r"Given the following conversation and a follow-up query, compress them into a single standalone query that captures all relevant context from the conversation.

Conversation:
{history}

Follow-up query: {query}

Standalone query:";

/// Collapses conversation history plus a follow-up query into one
/// standalone query, using a language model.
///
/// A query without history passes through unchanged; there is nothing to
/// compress and no model call is made.
#[derive(Debug)]
pub struct CompressionQueryTransformer {
    model: Arc<dyn ChatModel>,
    prompt_template: PromptTemplate,
}

impl CompressionQueryTransformer {
    /// Create a new compression transformer backed by the given model.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompt_template: PromptTemplate::new(DEFAULT_COMPRESSION_TEMPLATE),
        }
    }

    /// Override the compression prompt template. It should contain the
    /// `{history}` and `{query}` placeholders.
    #[must_use]
    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = template;
        self
    }

    fn format_history(history: &[ChatTurn]) -> String {
        history
            .iter()
            .map(|turn| format!("{}: {}", turn.role(), turn.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl QueryTransformer for CompressionQueryTransformer {
    async fn transform(&self, query: Query) -> Result<Query> {
        if !query.has_history() {
            debug!("No conversation history to compress, passing query through");
            return Ok(query);
        }

        let prompt = self.prompt_template.render(&[
            ("history", &Self::format_history(&query.history)),
            ("query", &query.text),
        ]);

        let response = self
            .model
            .call(&Prompt::from_text(prompt))
            .await
            .map_err(|e| {
                RagweaveError::transformation(format!("query compression failed: {e}"))
            })?;

        let compressed = response.content.trim();
        if compressed.is_empty() {
            return Err(RagweaveError::transformation(
                "query compression produced an empty query",
            ));
        }

        debug!(compressed = %compressed, "Compressed conversation into standalone query");
        Ok(query.with_text(compressed))
    }

    fn name(&self) -> &'static str {
        "CompressionQueryTransformer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragweave_core::{ChatResponse, ChatResponseStream, FinishReason};

    #[derive(Debug)]
    struct FixedModel(&'static str);

    #[async_trait]
    impl ChatModel for FixedModel {
        async fn call(&self, _prompt: &Prompt) -> Result<ChatResponse> {
            Ok(ChatResponse::new(self.0).with_finish_reason(FinishReason::Stop))
        }

        async fn stream(&self, prompt: &Prompt) -> Result<ChatResponseStream> {
            let response = self.call(prompt).await?;
            Ok(Box::pin(futures::stream::once(async move { Ok(response) })))
        }
    }

    #[derive(Debug)]
    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn call(&self, _prompt: &Prompt) -> Result<ChatResponse> {
            Err(RagweaveError::model("provider unavailable"))
        }

        async fn stream(&self, _prompt: &Prompt) -> Result<ChatResponseStream> {
            Err(RagweaveError::model("provider unavailable"))
        }
    }

    #[tokio::test]
    async fn test_identity_without_history() {
        let transformer = CompressionQueryTransformer::new(Arc::new(FailingModel));
        let query = Query::new("standalone already");
        let out = transformer.transform(query.clone()).await.unwrap();
        assert_eq!(out, query);
    }

    #[tokio::test]
    async fn test_compresses_history() {
        let transformer =
            CompressionQueryTransformer::new(Arc::new(FixedModel("What is Rust's mascot?")));
        let query = Query::builder()
            .text("What about its mascot?")
            .history(vec![
                ChatTurn::user("Tell me about Rust."),
                ChatTurn::assistant("Rust is a systems language."),
            ])
            .build();

        let out = transformer.transform(query.clone()).await.unwrap();
        assert_eq!(out.text, "What is Rust's mascot?");
        assert_eq!(out.history, query.history);
    }

    #[tokio::test]
    async fn test_model_failure_is_transformation_error() {
        let transformer = CompressionQueryTransformer::new(Arc::new(FailingModel));
        let query = Query::builder()
            .text("follow-up")
            .history(vec![ChatTurn::user("hi")])
            .build();

        let err = transformer.transform(query).await.unwrap_err();
        assert!(matches!(err, RagweaveError::Transformation { .. }));
    }

    #[tokio::test]
    async fn test_blank_output_is_transformation_error() {
        let transformer = CompressionQueryTransformer::new(Arc::new(FixedModel("   ")));
        let query = Query::builder()
            .text("follow-up")
            .history(vec![ChatTurn::user("hi")])
            .build();

        let err = transformer.transform(query).await.unwrap_err();
        assert!(matches!(err, RagweaveError::Transformation { .. }));
    }
}
