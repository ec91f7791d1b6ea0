//! # Ragweave Core
//!
//! Core traits, types, and interfaces for the Ragweave retrieval-augmented
//! generation (RAG) pipeline.
//!
//! This crate provides the foundational building blocks for augmenting
//! language model calls with retrieved context:
//!
//! - **Data structures**: `Query`, `Document`, `SearchRequest`, `Prompt`,
//!   and the `AdvisedRequest`/`AdvisedResponse` envelopes
//! - **Core traits**: `QueryTransformer`, `QueryExpander`,
//!   `DocumentRetriever`, `DocumentJoiner`, `QueryAugmenter`
//! - **Collaborator contracts**: `VectorStore` and `ChatModel`
//! - **Error handling**: `RagweaveError` with an explicit failure taxonomy
//!
//! ## Architecture
//!
//! Each pipeline role implements a well-defined trait, allowing easy
//! composition and testing:
//!
//! - **Transformers** rewrite a query before retrieval
//! - **Expanders** fan one query out into several
//! - **Retrievers** fetch candidate documents
//! - **Joiners** merge multi-query result sets
//! - **Augmenters** fold the retrieved context back into the prompt
//!
//! The orchestration of these roles, and the advisor chain that intercepts
//! model invocations around them, live in the `ragweave-query` crate.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude;

pub mod error;
pub mod traits;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{RagweaveError, Result};
pub use types::{
    AdvisedRequest, AdvisedResponse, ChatResponse, ChatTurn, Document, FilterExpression,
    FinishReason, Prompt, PromptTemplate, Query, SearchRequest, DEFAULT_TOP_K,
    FILTER_EXPRESSION_KEY, RETRIEVED_DOCUMENTS_KEY, SIMILARITY_THRESHOLD_ACCEPT_ALL,
};

// Re-export traits for convenience
pub use traits::*;

/// Version information for the Ragweave core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the Ragweave core library.
pub const NAME: &str = env!("CARGO_PKG_NAME");
