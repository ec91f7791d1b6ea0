//! Query augmentation trait.

use crate::{Document, Query};

/// Folds retrieved documents back into the query text, producing the final
/// outgoing prompt.
///
/// Augmentation is a pure, synchronous rendering step. Policy for the
/// empty-document case belongs to the implementation; see the contextual
/// augmenter in `ragweave-query` for the two-state empty-context policy.
pub trait QueryAugmenter: Send + Sync + std::fmt::Debug {
    /// Produce a new query whose text embeds a rendering of the documents.
    fn augment(&self, query: Query, documents: &[Document]) -> Query;

    /// Get a human-readable name for this augmenter.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
