//! Retrieval request types, filter expressions, and reserved context keys.

use serde::{Deserialize, Serialize};

use crate::error::{RagweaveError, Result};

/// Reserved context key under which a per-call filter expression override
/// may be supplied in `Query.context` or the advise context.
pub const FILTER_EXPRESSION_KEY: &str = "rag_filter_expression";

/// Reserved key under which the list of retrieved documents is attached to
/// response metadata after an advised call.
pub const RETRIEVED_DOCUMENTS_KEY: &str = "rag_retrieved_documents";

/// Similarity threshold that accepts all results.
pub const SIMILARITY_THRESHOLD_ACCEPT_ALL: f32 = 0.0;

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 4;

/// An opaque metadata filter expression.
///
/// The core never evaluates filter expressions; it threads them from the
/// caller (or the retriever configuration) to the document store, which
/// owns the grammar and its parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterExpression(String);

impl FilterExpression {
    /// Create a filter expression from its textual form.
    pub fn new<S: Into<String>>(expression: S) -> Self {
        Self(expression.into())
    }

    /// Get the textual form of the expression.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the expression is blank.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for FilterExpression {
    fn from(expression: &str) -> Self {
        Self::new(expression)
    }
}

impl From<String> for FilterExpression {
    fn from(expression: String) -> Self {
        Self(expression)
    }
}

impl std::fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A per-call search request sent to the document store.
///
/// A `SearchRequest` combines the retriever's base configuration
/// (similarity threshold, result count, static filter expression) with
/// per-invocation overrides (query text, dynamic filter expression). It is
/// built fresh for every call and never shared across calls.
///
/// # Examples
///
/// ```rust
/// use ragweave_core::types::SearchRequest;
///
/// let request = SearchRequest::builder()
///     .query("What is Rust?")
///     .top_k(5)
///     .similarity_threshold(0.7)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.top_k, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The query text to search for.
    pub query: String,

    /// Minimum similarity score for results, in `[0, 1]`.
    pub similarity_threshold: f32,

    /// Maximum number of results to return.
    pub top_k: usize,

    /// Optional metadata filter expression scoping the search.
    pub filter_expression: Option<FilterExpression>,
}

impl SearchRequest {
    /// Create a builder for constructing search requests.
    #[must_use]
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::default()
    }

    /// Create a builder pre-populated from this request.
    ///
    /// Used to derive a per-call request from a configured base request.
    #[must_use]
    pub fn mutate(&self) -> SearchRequestBuilder {
        SearchRequestBuilder {
            query: Some(self.query.clone()),
            similarity_threshold: Some(self.similarity_threshold),
            top_k: Some(self.top_k),
            filter_expression: self.filter_expression.clone(),
        }
    }

    /// Check if the request carries a filter expression.
    pub fn has_filter(&self) -> bool {
        self.filter_expression.is_some()
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            similarity_threshold: SIMILARITY_THRESHOLD_ACCEPT_ALL,
            top_k: DEFAULT_TOP_K,
            filter_expression: None,
        }
    }
}

/// Builder for [`SearchRequest`], validated eagerly at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SearchRequestBuilder {
    query: Option<String>,
    similarity_threshold: Option<f32>,
    top_k: Option<usize>,
    filter_expression: Option<FilterExpression>,
}

impl SearchRequestBuilder {
    /// Set the query text.
    #[must_use]
    pub fn query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the minimum similarity threshold.
    #[must_use]
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Set the maximum number of results.
    #[must_use]
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the filter expression.
    #[must_use]
    pub fn filter_expression(mut self, expression: Option<FilterExpression>) -> Self {
        self.filter_expression = expression;
        self
    }

    /// Build the search request.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the similarity threshold is outside
    /// `[0, 1]` or `top_k` is zero.
    pub fn build(self) -> Result<SearchRequest> {
        let similarity_threshold = self
            .similarity_threshold
            .unwrap_or(SIMILARITY_THRESHOLD_ACCEPT_ALL);
        if !(0.0..=1.0).contains(&similarity_threshold) {
            return Err(RagweaveError::configuration(format!(
                "similarity threshold must be in [0, 1], got {similarity_threshold}"
            )));
        }

        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(RagweaveError::configuration("top_k must be at least 1"));
        }

        Ok(SearchRequest {
            query: self.query.unwrap_or_default(),
            similarity_threshold,
            top_k,
            filter_expression: self.filter_expression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_request_defaults() {
        let request = SearchRequest::default();
        assert_eq!(request.similarity_threshold, SIMILARITY_THRESHOLD_ACCEPT_ALL);
        assert_eq!(request.top_k, DEFAULT_TOP_K);
        assert!(!request.has_filter());
    }

    #[test]
    fn test_search_request_builder_validation() {
        let err = SearchRequest::builder()
            .similarity_threshold(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, RagweaveError::Configuration { .. }));

        let err = SearchRequest::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagweaveError::Configuration { .. }));
    }

    #[test]
    fn test_search_request_mutate() {
        let base = SearchRequest::builder()
            .similarity_threshold(0.6)
            .top_k(7)
            .filter_expression(Some("category == 'rust'".into()))
            .build()
            .unwrap();

        let derived = base.mutate().query("per-call text").build().unwrap();
        assert_eq!(derived.query, "per-call text");
        assert_eq!(derived.similarity_threshold, 0.6);
        assert_eq!(derived.top_k, 7);
        assert_eq!(derived.filter_expression, base.filter_expression);
    }

    #[test]
    fn test_filter_expression() {
        let expr = FilterExpression::new("author == 'doe'");
        assert_eq!(expr.as_str(), "author == 'doe'");
        assert!(!expr.is_blank());
        assert!(FilterExpression::new("   ").is_blank());
        assert_eq!(expr.to_string(), "author == 'doe'");
    }
}
