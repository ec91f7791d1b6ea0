//! Vector store backed document retriever.

use std::sync::Arc;

use async_trait::async_trait;
use ragweave_core::{
    Document, DocumentRetriever, FilterExpression, Query, RagweaveError, Result, SearchRequest,
    VectorStore, FILTER_EXPRESSION_KEY,
};
use tracing::debug;

/// Retrieves documents from a [`VectorStore`] using similarity search.
///
/// The retriever carries a base [`SearchRequest`] (similarity threshold,
/// result count, static filter expression) and derives a fresh per-call
/// request for every query. A filter expression supplied in the query
/// context under [`FILTER_EXPRESSION_KEY`] takes precedence over the
/// configured default; with no per-call value the default is used
/// unchanged.
///
/// # Examples
///
/// ```rust,no_run
/// use ragweave_query::retriever::VectorStoreRetriever;
/// use std::sync::Arc;
///
/// # fn example(store: Arc<dyn ragweave_core::VectorStore>) -> ragweave_core::Result<()> {
/// let retriever = VectorStoreRetriever::builder()
///     .vector_store(store)
///     .similarity_threshold(0.7)
///     .top_k(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VectorStoreRetriever {
    vector_store: Arc<dyn VectorStore>,
    base_request: SearchRequest,
}

impl VectorStoreRetriever {
    /// Create a builder for constructing retrievers.
    #[must_use]
    pub fn builder() -> VectorStoreRetrieverBuilder {
        VectorStoreRetrieverBuilder::default()
    }

    /// Resolve the filter expression for a call: per-call override from the
    /// query context wins over the configured default.
    fn resolve_filter(&self, query: &Query) -> Option<FilterExpression> {
        if let Some(serde_json::Value::String(raw)) = query.context_value(FILTER_EXPRESSION_KEY) {
            if !raw.trim().is_empty() {
                return Some(FilterExpression::new(raw.clone()));
            }
        }
        self.base_request.filter_expression.clone()
    }
}

#[async_trait]
impl DocumentRetriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &Query) -> Result<Vec<Document>> {
        let request = self
            .base_request
            .mutate()
            .query(query.text.clone())
            .filter_expression(self.resolve_filter(query))
            .build()?;

        let documents = self.vector_store.search(&request).await?;
        debug!(
            query = %request.query,
            count = documents.len(),
            "Retrieved documents from vector store"
        );
        Ok(documents)
    }

    fn name(&self) -> &'static str {
        "VectorStoreRetriever"
    }
}

/// Builder for [`VectorStoreRetriever`], validated eagerly at
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct VectorStoreRetrieverBuilder {
    vector_store: Option<Arc<dyn VectorStore>>,
    similarity_threshold: Option<f32>,
    top_k: Option<usize>,
    filter_expression: Option<FilterExpression>,
}

impl VectorStoreRetrieverBuilder {
    /// Set the vector store to search.
    #[must_use]
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the minimum similarity threshold.
    #[must_use]
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Set the maximum number of results per query.
    #[must_use]
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the default filter expression, used when no per-call override is
    /// present.
    #[must_use]
    pub fn filter_expression(mut self, expression: FilterExpression) -> Self {
        self.filter_expression = Some(expression);
        self
    }

    /// Build the retriever.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no vector store was supplied or the
    /// search settings are invalid.
    pub fn build(self) -> Result<VectorStoreRetriever> {
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagweaveError::configuration("retriever requires a vector store"))?;

        let mut base = SearchRequest::builder().filter_expression(self.filter_expression);
        if let Some(threshold) = self.similarity_threshold {
            base = base.similarity_threshold(threshold);
        }
        if let Some(top_k) = self.top_k {
            base = base.top_k(top_k);
        }

        Ok(VectorStoreRetriever {
            vector_store,
            base_request: base.build()?,
        })
    }
}
