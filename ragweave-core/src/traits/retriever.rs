//! Retrieval traits for finding relevant documents.

use async_trait::async_trait;

use crate::{Document, Query, Result, SearchRequest};

/// Retrieves candidate documents for a query.
///
/// Implementations can wrap a vector store, a keyword index, or any other
/// source. Retrieval failures propagate unchanged; this core never retries
/// and never substitutes a partial or empty result for a failure, since a
/// silently empty result would steer the augmenter into the wrong
/// empty-context branch.
///
/// # Examples
///
/// ```rust,no_run
/// use ragweave_core::traits::DocumentRetriever;
/// use ragweave_core::{Document, Query, Result};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct StaticRetriever(Vec<Document>);
///
/// #[async_trait]
/// impl DocumentRetriever for StaticRetriever {
///     async fn retrieve(&self, _query: &Query) -> Result<Vec<Document>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentRetriever: Send + Sync + std::fmt::Debug {
    /// Retrieve documents for a query.
    ///
    /// # Returns
    ///
    /// Documents ordered by relevance (most relevant first).
    ///
    /// # Errors
    ///
    /// Returns a retrieval error if the underlying store call fails or
    /// times out.
    async fn retrieve(&self, query: &Query) -> Result<Vec<Document>>;

    /// Get a human-readable name for this retriever.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Similarity search over a document store — an external collaborator
/// contract.
///
/// The store owns the similarity metric and the filter-expression grammar;
/// this core only threads [`SearchRequest`] values through to it.
#[async_trait]
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Run a similarity search.
    ///
    /// # Errors
    ///
    /// Returns a retrieval error if the search fails. Timeouts are the
    /// store's responsibility; they surface here unchanged.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>>;

    /// Get a human-readable name for this store.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
