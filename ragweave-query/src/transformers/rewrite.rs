//! Query rewriting transformer.

use std::sync::Arc;

use async_trait::async_trait;
use ragweave_core::{
    ChatModel, Prompt, PromptTemplate, Query, QueryTransformer, RagweaveError, Result,
};
use tracing::debug;

const DEFAULT_REWRITE_TEMPLATE: &str = r"Given a user query, rewrite it to provide better results when querying a {target}.
Remove any irrelevant information, and ensure the query is concise and specific.

Original query: {query}

Rewritten query:";

const DEFAULT_TARGET: &str = "vector store";

/// Restates a query so it retrieves better against a given target system,
/// using a language model.
#[derive(Debug)]
pub struct RewriteQueryTransformer {
    model: Arc<dyn ChatModel>,
    prompt_template: PromptTemplate,
    target: String,
}

impl RewriteQueryTransformer {
    /// Create a new rewrite transformer backed by the given model,
    /// targeting a vector store.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompt_template: PromptTemplate::new(DEFAULT_REWRITE_TEMPLATE),
            target: DEFAULT_TARGET.to_string(),
        }
    }

    /// Set the retrieval target named in the rewrite prompt (e.g.
    /// "web search engine").
    #[must_use]
    pub fn with_target<S: Into<String>>(mut self, target: S) -> Self {
        self.target = target.into();
        self
    }

    /// Override the rewrite prompt template. It should contain the
    /// `{target}` and `{query}` placeholders.
    #[must_use]
    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = template;
        self
    }
}

#[async_trait]
impl QueryTransformer for RewriteQueryTransformer {
    async fn transform(&self, query: Query) -> Result<Query> {
        let prompt = self
            .prompt_template
            .render(&[("target", self.target.as_str()), ("query", &query.text)]);

        let response = self
            .model
            .call(&Prompt::from_text(prompt))
            .await
            .map_err(|e| RagweaveError::transformation(format!("query rewrite failed: {e}")))?;

        let rewritten = response.content.trim();
        if rewritten.is_empty() {
            return Err(RagweaveError::transformation(
                "query rewrite produced an empty query",
            ));
        }

        debug!(original = %query.text, rewritten = %rewritten, "Rewrote query");
        Ok(query.with_text(rewritten))
    }

    fn name(&self) -> &'static str {
        "RewriteQueryTransformer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragweave_core::{ChatResponse, ChatResponseStream, FinishReason};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordingModel {
        reply: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn call(&self, prompt: &Prompt) -> Result<ChatResponse> {
            self.prompts
                .lock()
                .unwrap()
                .push(prompt.user_text().to_string());
            Ok(ChatResponse::new(self.reply).with_finish_reason(FinishReason::Stop))
        }

        async fn stream(&self, prompt: &Prompt) -> Result<ChatResponseStream> {
            let response = self.call(prompt).await?;
            Ok(Box::pin(futures::stream::once(async move { Ok(response) })))
        }
    }

    #[tokio::test]
    async fn test_rewrite_uses_model_output() {
        let model = Arc::new(RecordingModel {
            reply: "rust ownership rules",
            prompts: Mutex::new(Vec::new()),
        });
        let transformer = RewriteQueryTransformer::new(model.clone());

        let out = transformer
            .transform(Query::new("tell me about how rust owns stuff please"))
            .await
            .unwrap();
        assert_eq!(out.text, "rust ownership rules");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("vector store"));
        assert!(prompts[0].contains("tell me about how rust owns stuff please"));
    }

    #[tokio::test]
    async fn test_custom_target_appears_in_prompt() {
        let model = Arc::new(RecordingModel {
            reply: "ok",
            prompts: Mutex::new(Vec::new()),
        });
        let transformer =
            RewriteQueryTransformer::new(model.clone()).with_target("web search engine");

        transformer.transform(Query::new("q")).await.unwrap();
        assert!(model.prompts.lock().unwrap()[0].contains("web search engine"));
    }
}
