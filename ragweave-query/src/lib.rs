//! # Ragweave Query
//!
//! Query transformation, retrieval orchestration, and the advisor
//! interception chain for the Ragweave RAG framework.
//!
//! This crate provides the concrete pipeline pieces on top of the
//! contracts defined in `ragweave-core`:
//!
//! - **Transformers**: conversation compression, query rewriting,
//!   translation, and multi-query expansion
//! - **Retriever**: a vector-store-backed document retriever with per-call
//!   filter precedence
//! - **Joiners**: order-preserving concatenation with first-wins
//!   deduplication, and reciprocal rank fusion
//! - **Augmenter**: contextual augmentation with a two-state empty-context
//!   policy
//! - **Orchestrator**: [`pipeline::RetrievalPipeline`], the deterministic
//!   transform → expand → retrieve → join → augment sequence
//! - **Advisors**: [`advisor::AdvisorChain`] and
//!   [`advisor::RetrievalAugmentationAdvisor`], wrapping unary and
//!   streaming model invocations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragweave_query::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     store: Arc<dyn ragweave_core::VectorStore>,
//! #     model: Arc<dyn ragweave_core::ChatModel>,
//! # ) -> ragweave_core::Result<()> {
//! let retriever = VectorStoreRetriever::builder()
//!     .vector_store(store)
//!     .top_k(5)
//!     .build()?;
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .document_retriever(Arc::new(retriever))
//!     .build()?;
//!
//! let chain = AdvisorChain::builder()
//!     .advisor(Arc::new(RetrievalAugmentationAdvisor::new(Arc::new(pipeline))))
//!     .model(model)
//!     .build()?;
//!
//! let request = AdvisedRequest::builder()
//!     .user_text("What is the capital of Denmark?")
//!     .build()?;
//! let response = chain.call(request).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod advisor;
pub mod augmenter;
pub mod joiners;
pub mod pipeline;
pub mod prelude;
pub mod retriever;
pub mod transformers;

// Re-export key types at crate root for convenience
pub use advisor::{AdvisorChain, RetrievalAugmentationAdvisor};
pub use augmenter::ContextualQueryAugmenter;
pub use joiners::{ConcatenationDocumentJoiner, ReciprocalRankFusionJoiner};
pub use pipeline::{RetrievalOutcome, RetrievalPipeline};
pub use retriever::VectorStoreRetriever;
