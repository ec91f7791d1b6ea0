//! Contextual query augmentation.

use ragweave_core::{Document, PromptTemplate, Query, QueryAugmenter};
use tracing::debug;

const DEFAULT_PROMPT_TEMPLATE: &str = r"Context information is below.

---------------------
{context}
---------------------

Given the context information and no prior knowledge, answer the query.

Follow these rules:

1. If the answer is not in the context, just say that you don't know.
2. Avoid statements like 'Based on the context...' or 'The provided information...'.

Query: {query}

Answer:";

const DEFAULT_NO_ANSWER_TEMPLATE: &str = r"The user query is outside your knowledge base.
Politely inform the user that you cannot answer it.

Query: {query}";

const DEFAULT_EMPTY_CONTEXT_TEMPLATE: &str = r"No context information was retrieved for this query.
Answer the query as well as you can, stating clearly that no supporting context was found.

Query: {query}";

/// Folds retrieved documents into the query text using prompt templates,
/// with an explicit two-state policy for the empty-context case.
///
/// - Non-empty documents: the contextual template is rendered with the
///   document texts (`{context}`) and the query (`{query}`).
/// - Empty documents with `allow_empty_context = false` (default): the
///   no-answer template steers the model toward explicitly declining
///   instead of hallucinating.
/// - Empty documents with `allow_empty_context = true`: the empty-context
///   template instructs the model to answer despite the known-empty
///   context.
///
/// Both empty-context branches are first-class, independently overridable
/// templates, not fallbacks.
#[derive(Debug, Clone)]
pub struct ContextualQueryAugmenter {
    prompt_template: PromptTemplate,
    no_answer_template: PromptTemplate,
    empty_context_template: PromptTemplate,
    allow_empty_context: bool,
}

impl ContextualQueryAugmenter {
    /// Create a new augmenter with the default templates and
    /// `allow_empty_context = false`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prompt_template: PromptTemplate::new(DEFAULT_PROMPT_TEMPLATE),
            no_answer_template: PromptTemplate::new(DEFAULT_NO_ANSWER_TEMPLATE),
            empty_context_template: PromptTemplate::new(DEFAULT_EMPTY_CONTEXT_TEMPLATE),
            allow_empty_context: false,
        }
    }

    /// Override the contextual template. It should contain the `{context}`
    /// and `{query}` placeholders.
    #[must_use]
    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = template;
        self
    }

    /// Override the no-answer template used when context is empty and
    /// empty context is not allowed.
    #[must_use]
    pub fn with_no_answer_template(mut self, template: PromptTemplate) -> Self {
        self.no_answer_template = template;
        self
    }

    /// Override the empty-context template used when context is empty and
    /// empty context is allowed.
    #[must_use]
    pub fn with_empty_context_template(mut self, template: PromptTemplate) -> Self {
        self.empty_context_template = template;
        self
    }

    /// Set whether an empty document sequence still augments normally.
    #[must_use]
    pub fn with_allow_empty_context(mut self, allow: bool) -> Self {
        self.allow_empty_context = allow;
        self
    }
}

impl Default for ContextualQueryAugmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAugmenter for ContextualQueryAugmenter {
    fn augment(&self, query: Query, documents: &[Document]) -> Query {
        if documents.is_empty() {
            let template = if self.allow_empty_context {
                debug!("Empty context allowed, using empty-context template");
                &self.empty_context_template
            } else {
                debug!("Empty context not allowed, using no-answer template");
                &self.no_answer_template
            };
            return query.with_text(template.render(&[("query", query.text.as_str())]));
        }

        let context = documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let augmented = self
            .prompt_template
            .render(&[("context", context.as_str()), ("query", query.text.as_str())]);

        debug!(documents = documents.len(), "Augmented query with context");
        query.with_text(augmented)
    }

    fn name(&self) -> &'static str {
        "ContextualQueryAugmenter"
    }
}
