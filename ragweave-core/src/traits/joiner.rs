//! Document joining trait.

use crate::{Document, Query};

/// The result sets produced by retrieving each (possibly expanded) query:
/// an ordered sequence of `(query, result lists)` pairs. The outer order is
/// the retrieval order and is part of the joining contract; each query may
/// carry several ranked result lists when documents come from multiple
/// sources.
pub type QueryResults = Vec<(Query, Vec<Vec<Document>>)>;

/// Merges multi-query, multi-source document result sets into one.
///
/// Joining is a pure, synchronous computation over already-retrieved
/// documents. Strategies are swappable; the orchestrator invokes whichever
/// joiner is installed exactly once per run.
pub trait DocumentJoiner: Send + Sync + std::fmt::Debug {
    /// Join the per-query result sets into a single document sequence.
    fn join(&self, results: QueryResults) -> Vec<Document>;

    /// Get a human-readable name for this joiner.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
