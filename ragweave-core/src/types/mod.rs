//! Core data types for the Ragweave framework.
//!
//! This module contains the fundamental data structures used throughout
//! the retrieval pipeline and the advisor chain: queries, documents,
//! search requests, prompts, and the advised request/response envelopes.

pub mod advised;
pub mod chat;
pub mod document;
pub mod query;
pub mod retrieval;
pub mod template;

// Re-export all types for convenience
pub use advised::*;
pub use chat::*;
pub use document::*;
pub use query::*;
pub use retrieval::*;
pub use template::*;
