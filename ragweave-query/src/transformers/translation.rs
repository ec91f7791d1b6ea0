//! Query translation transformer.

use std::sync::Arc;

use async_trait::async_trait;
use ragweave_core::{
    ChatModel, Prompt, PromptTemplate, Query, QueryTransformer, RagweaveError, Result,
};
use tracing::debug;

const DEFAULT_TRANSLATION_TEMPLATE: &str = r"Given a user query, translate it to {language}.
If the query is already in {language} or you cannot determine its language, return it unchanged, with no explanation.

Query: {query}

Translated query:";

/// Translates a query into the retriever's expected language, using a
/// language model.
///
/// When the model returns a blank result (the query is already in the
/// target language, or its language cannot be determined), the original
/// query passes through unchanged.
#[derive(Debug)]
pub struct TranslationQueryTransformer {
    model: Arc<dyn ChatModel>,
    prompt_template: PromptTemplate,
    target_language: String,
}

impl TranslationQueryTransformer {
    /// Create a new translation transformer for the given target language.
    pub fn new<S: Into<String>>(model: Arc<dyn ChatModel>, target_language: S) -> Self {
        Self {
            model,
            prompt_template: PromptTemplate::new(DEFAULT_TRANSLATION_TEMPLATE),
            target_language: target_language.into(),
        }
    }

    /// Override the translation prompt template. It should contain the
    /// `{language}` and `{query}` placeholders.
    #[must_use]
    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = template;
        self
    }
}

#[async_trait]
impl QueryTransformer for TranslationQueryTransformer {
    async fn transform(&self, query: Query) -> Result<Query> {
        let prompt = self.prompt_template.render(&[
            ("language", self.target_language.as_str()),
            ("query", &query.text),
        ]);

        let response = self
            .model
            .call(&Prompt::from_text(prompt))
            .await
            .map_err(|e| RagweaveError::transformation(format!("query translation failed: {e}")))?;

        let translated = response.content.trim();
        if translated.is_empty() {
            debug!("Translation model returned a blank result, keeping original query");
            return Ok(query);
        }

        debug!(language = %self.target_language, translated = %translated, "Translated query");
        Ok(query.with_text(translated))
    }

    fn name(&self) -> &'static str {
        "TranslationQueryTransformer"
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

    #[tokio::test]
    async fn test_translates_query() {
        let transformer =
            TranslationQueryTransformer::new(Arc::new(FixedModel("Hvad er Rust?")), "Danish");
        let out = transformer.transform(Query::new("What is Rust?")).await.unwrap();
        assert_eq!(out.text, "Hvad er Rust?");
    }

    #[tokio::test]
    async fn test_blank_result_keeps_original() {
        let transformer = TranslationQueryTransformer::new(Arc::new(FixedModel("  ")), "Danish");
        let query = Query::new("Hvad er Rust?");
        let out = transformer.transform(query.clone()).await.unwrap();
        assert_eq!(out, query);
    }
}
