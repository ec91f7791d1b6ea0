//! Multi-query expansion.

use std::sync::Arc;

use async_trait::async_trait;
use ragweave_core::{
    ChatModel, Prompt, PromptTemplate, Query, QueryExpander, RagweaveError, Result,
};
use tracing::{debug, warn};

const DEFAULT_EXPANSION_TEMPLATE: &str = r"You are an expert at information retrieval and search optimization.
Generate {number} different versions of the given query, each on its own line.
Each variant should cover a different perspective or phrasing of the same information need.
Do not explain or number the variants.

Query: {query}

Variants:";

const DEFAULT_NUMBER_OF_QUERIES: usize = 3;

/// Expands one query into a fixed-size ordered set of query variants,
/// using a language model.
///
/// With `include_original` the original query comes first and counts
/// toward `number_of_queries`. The model may under-deliver; fewer variants
/// than requested are tolerated (and logged), never padded.
#[derive(Debug)]
pub struct MultiQueryExpander {
    model: Arc<dyn ChatModel>,
    prompt_template: PromptTemplate,
    number_of_queries: usize,
    include_original: bool,
}

impl MultiQueryExpander {
    /// Create a builder for constructing expanders.
    #[must_use]
    pub fn builder() -> MultiQueryExpanderBuilder {
        MultiQueryExpanderBuilder::default()
    }

    /// Parse model output into query variants, stripping list numbering and
    /// bullet prefixes.
    fn parse_variants(text: &str, limit: usize) -> Vec<String> {
        let mut variants = Vec::new();
        for line in text.lines() {
            let cleaned = Self::strip_list_marker(line);
            if !cleaned.is_empty() {
                variants.push(cleaned.to_string());
            }
            if variants.len() >= limit {
                break;
            }
        }
        variants
    }

    /// Strip a leading list marker: digits followed by `.` or `)`, or a
    /// `-`/`*` bullet followed by whitespace. A variant that merely starts
    /// with a number ("2024 election trends") is content, not a marker, and
    /// passes through intact.
    fn strip_list_marker(line: &str) -> &str {
        let trimmed = line.trim();

        let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 {
            let rest = &trimmed[digits..];
            if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
                return stripped.trim();
            }
            return trimmed;
        }

        if let Some(stripped) = trimmed.strip_prefix('-').or_else(|| trimmed.strip_prefix('*')) {
            if stripped.starts_with(char::is_whitespace) {
                return stripped.trim();
            }
        }

        trimmed
    }
}

#[async_trait]
impl QueryExpander for MultiQueryExpander {
    async fn expand(&self, query: Query) -> Result<Vec<Query>> {
        let to_generate = if self.include_original {
            self.number_of_queries - 1
        } else {
            self.number_of_queries
        };

        if to_generate == 0 {
            return Ok(vec![query]);
        }

        let prompt = self.prompt_template.render(&[
            ("number", to_generate.to_string().as_str()),
            ("query", &query.text),
        ]);

        let response = self
            .model
            .call(&Prompt::from_text(prompt))
            .await
            .map_err(|e| RagweaveError::transformation(format!("query expansion failed: {e}")))?;

        let variants = Self::parse_variants(&response.content, to_generate);
        if variants.is_empty() {
            warn!("Query expansion produced no variants, falling back to the original query");
            return Ok(vec![query]);
        }
        if variants.len() < to_generate {
            warn!(
                requested = to_generate,
                produced = variants.len(),
                "Query expansion under-delivered"
            );
        }

        // Every variant inherits the original history and context, so
        // per-call settings (e.g. a filter override) survive expansion.
        let mut queries: Vec<Query> = Vec::with_capacity(self.number_of_queries);
        if self.include_original {
            queries.push(query.clone());
        }
        queries.extend(variants.into_iter().map(|text| query.with_text(text)));

        debug!(count = queries.len(), "Expanded query");
        Ok(queries)
    }

    fn name(&self) -> &'static str {
        "MultiQueryExpander"
    }
}

/// Builder for [`MultiQueryExpander`], validated eagerly at
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct MultiQueryExpanderBuilder {
    model: Option<Arc<dyn ChatModel>>,
    prompt_template: Option<PromptTemplate>,
    number_of_queries: Option<usize>,
    include_original: Option<bool>,
}

impl MultiQueryExpanderBuilder {
    /// Set the language model used to generate variants.
    #[must_use]
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Override the expansion prompt template. It should contain the
    /// `{number}` and `{query}` placeholders.
    #[must_use]
    pub fn prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = Some(template);
        self
    }

    /// Total number of queries to produce, including the original when
    /// [`include_original`](Self::include_original) is set. Default 3.
    #[must_use]
    pub fn number_of_queries(mut self, number: usize) -> Self {
        self.number_of_queries = Some(number);
        self
    }

    /// Whether the original query is part of the output. Default `true`.
    #[must_use]
    pub fn include_original(mut self, include: bool) -> Self {
        self.include_original = Some(include);
        self
    }

    /// Build the expander.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no model was supplied or
    /// `number_of_queries` is zero.
    pub fn build(self) -> Result<MultiQueryExpander> {
        let model = self
            .model
            .ok_or_else(|| RagweaveError::configuration("query expander requires a model"))?;

        let number_of_queries = self.number_of_queries.unwrap_or(DEFAULT_NUMBER_OF_QUERIES);
        if number_of_queries == 0 {
            return Err(RagweaveError::configuration(
                "number_of_queries must be at least 1",
            ));
        }

        Ok(MultiQueryExpander {
            model,
            prompt_template: self
                .prompt_template
                .unwrap_or_else(|| PromptTemplate::new(DEFAULT_EXPANSION_TEMPLATE)),
            number_of_queries,
            include_original: self.include_original.unwrap_or(true),
        })
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

    fn expander(reply: &'static str, number: usize, include_original: bool) -> MultiQueryExpander {
        MultiQueryExpander::builder()
            .model(Arc::new(FixedModel(reply)))
            .number_of_queries(number)
            .include_original(include_original)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fan_out_includes_original() {
        let expander = expander("1. variant one\n2. variant two", 3, true);
        let queries = expander.expand(Query::new("Q")).await.unwrap();

        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].text, "Q");
        assert_eq!(queries[1].text, "variant one");
        assert_eq!(queries[2].text, "variant two");
    }

    #[tokio::test]
    async fn test_fan_out_without_original() {
        let expander = expander("alpha\nbeta\ngamma", 3, false);
        let queries = expander.expand(Query::new("Q")).await.unwrap();

        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|q| q.text != "Q"));
    }

    #[tokio::test]
    async fn test_single_query_with_original_skips_model() {
        let expander = MultiQueryExpander::builder()
            .model(Arc::new(FixedModel("should not be used")))
            .number_of_queries(1)
            .include_original(true)
            .build()
            .unwrap();

        let queries = expander.expand(Query::new("Q")).await.unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "Q");
    }

    #[tokio::test]
    async fn test_empty_output_falls_back_to_original() {
        let expander = expander("", 3, false);
        let queries = expander.expand(Query::new("Q")).await.unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "Q");
    }

    #[tokio::test]
    async fn test_variants_inherit_context() {
        let expander = expander("variant", 2, true);
        let query = Query::builder().text("Q").context("tenant", "acme").build();
        let queries = expander.expand(query).await.unwrap();

        assert!(queries.iter().all(|q| q.context_value("tenant").is_some()));
    }

    #[test]
    fn test_builder_validation() {
        let err = MultiQueryExpander::builder().build().unwrap_err();
        assert!(matches!(err, RagweaveError::Configuration { .. }));

        let err = MultiQueryExpander::builder()
            .model(Arc::new(FixedModel("x")))
            .number_of_queries(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, RagweaveError::Configuration { .. }));
    }

    #[test]
    fn test_parse_variants_strips_prefixes() {
        let parsed = MultiQueryExpander::parse_variants("1. one\n- two\n  * three\n\n", 5);
        assert_eq!(parsed, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_parse_variants_keeps_leading_numbers_in_content() {
        let parsed = MultiQueryExpander::parse_variants(
            "2024 election trends\n3) voter turnout by state\n-no space bullet",
            5,
        );
        assert_eq!(
            parsed,
            vec![
                "2024 election trends",
                "voter turnout by state",
                "-no space bullet"
            ]
        );
    }
}
