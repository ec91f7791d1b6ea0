//! Convenient re-exports of the most commonly used types and traits.
//!
//! ```rust
//! use ragweave_core::prelude::*;
//! ```

pub use crate::error::{RagweaveError, Result};
pub use crate::traits::{
    ChatModel, ChatResponseStream, DocumentJoiner, DocumentRetriever, QueryAugmenter,
    QueryExpander, QueryResults, QueryTransformer, VectorStore,
};
pub use crate::types::{
    AdvisedRequest, AdvisedResponse, ChatResponse, ChatTurn, Document, FilterExpression,
    FinishReason, Prompt, PromptTemplate, Query, SearchRequest, FILTER_EXPRESSION_KEY,
    RETRIEVED_DOCUMENTS_KEY,
};
