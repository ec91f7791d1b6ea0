//! Core traits for the Ragweave framework.
//!
//! Every pipeline role — transformer, expander, retriever, joiner,
//! augmenter — and every external collaborator — document store, language
//! model — is a trait here, so each piece is independently swappable.

pub mod augmenter;
pub mod chat;
pub mod joiner;
pub mod retriever;
pub mod transformer;

pub use augmenter::QueryAugmenter;
pub use chat::{ChatModel, ChatResponseStream};
pub use joiner::{DocumentJoiner, QueryResults};
pub use retriever::{DocumentRetriever, VectorStore};
pub use transformer::{QueryExpander, QueryTransformer};
