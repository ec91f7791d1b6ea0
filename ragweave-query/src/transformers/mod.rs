//! Query transformers and the multi-query expander.
//!
//! Each transformer implements the `QueryTransformer` contract from
//! `ragweave-core`: take a query, produce a new query, surface failures as
//! transformation errors. The expander implements `QueryExpander` and fans
//! one query out into several.

pub mod compression;
pub mod expansion;
pub mod rewrite;
pub mod translation;

pub use compression::CompressionQueryTransformer;
pub use expansion::{MultiQueryExpander, MultiQueryExpanderBuilder};
pub use rewrite::RewriteQueryTransformer;
pub use translation::TranslationQueryTransformer;
