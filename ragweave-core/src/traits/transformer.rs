//! Query transformation traits.
//!
//! Transformers rewrite a query before retrieval (compression, rewriting,
//! translation); expanders fan a single query out into several. Both are
//! pure with respect to their input: they always produce new queries and
//! never mutate the one they were given.

use async_trait::async_trait;

use crate::{Query, Result};

/// Transforms a query into a new query better suited for retrieval.
///
/// Implementations may call out to a language model; a failed model call
/// surfaces as a [`crate::RagweaveError::Transformation`] error and aborts
/// the invocation, it is never swallowed.
///
/// # Examples
///
/// ```rust,no_run
/// use ragweave_core::traits::QueryTransformer;
/// use ragweave_core::{Query, Result};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct UppercaseTransformer;
///
/// #[async_trait]
/// impl QueryTransformer for UppercaseTransformer {
///     async fn transform(&self, query: Query) -> Result<Query> {
///         let text = query.text.to_uppercase();
///         Ok(query.with_text(text))
///     }
/// }
/// ```
#[async_trait]
pub trait QueryTransformer: Send + Sync + std::fmt::Debug {
    /// Transform the query, producing a new one.
    ///
    /// # Errors
    ///
    /// Returns a transformation error if the transformer cannot produce a
    /// result.
    async fn transform(&self, query: Query) -> Result<Query>;

    /// Get a human-readable name for this transformer.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Expands one query into an ordered sequence of queries.
///
/// Expansion multiplies retrieval: the orchestrator retrieves once per
/// expanded query and joins the result sets afterwards.
#[async_trait]
pub trait QueryExpander: Send + Sync + std::fmt::Debug {
    /// Expand the query into one or more queries.
    ///
    /// The returned sequence is never empty; an expander that produces
    /// nothing returns the original query.
    async fn expand(&self, query: Query) -> Result<Vec<Query>>;

    /// Get a human-readable name for this expander.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
