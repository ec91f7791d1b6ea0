//! Convenient re-exports of the most commonly used types and traits.
//!
//! ```rust
//! use ragweave_query::prelude::*;
//! ```

pub use crate::advisor::{
    AdvisedResponseStream, AdvisorChain, CallAdvisor, CallAdvisorChain,
    RetrievalAugmentationAdvisor, StreamAdvisor, StreamAdvisorChain,
};
pub use crate::augmenter::ContextualQueryAugmenter;
pub use crate::joiners::{ConcatenationDocumentJoiner, ReciprocalRankFusionJoiner};
pub use crate::pipeline::{RetrievalOutcome, RetrievalPipeline};
pub use crate::retriever::VectorStoreRetriever;
pub use crate::transformers::{
    CompressionQueryTransformer, MultiQueryExpander, RewriteQueryTransformer,
    TranslationQueryTransformer,
};

pub use ragweave_core::prelude::*;
