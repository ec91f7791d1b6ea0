//! The advisor interception chain.
//!
//! An advisor wraps a single model invocation: it may mutate the outgoing
//! request before the next link runs and the incoming response after. The
//! chain supports two invocation shapes sharing one before-transform — a
//! unary call and a streaming call that delivers response fragments lazily.
//!
//! Advisors are sorted by [`order`](CallAdvisor::order) ascending before
//! execution; lower orders run first on the request path. Only request-path
//! ordering is a contract.

pub mod chain;
pub mod retrieval;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use ragweave_core::{AdvisedRequest, AdvisedResponse, Result};

pub use chain::{AdvisorChain, AdvisorChainBuilder};
pub use retrieval::{RetrievalAugmentationAdvisor, RetrievalAugmentationAdvisorBuilder};

/// A lazy, ordered, finite sequence of advised response fragments.
///
/// Restartable only by re-invoking the whole chain, never by resuming
/// mid-stream.
pub type AdvisedResponseStream = Pin<Box<dyn Stream<Item = Result<AdvisedResponse>> + Send>>;

/// Default execution order for advisors.
pub const DEFAULT_ADVISOR_ORDER: i32 = 0;

/// An advisor wrapping the unary invocation shape.
#[async_trait]
pub trait CallAdvisor: Send + Sync + std::fmt::Debug {
    /// Get a human-readable name for this advisor.
    fn name(&self) -> &'static str;

    /// Execution order within the chain; lower runs first on the request
    /// path.
    fn order(&self) -> i32 {
        DEFAULT_ADVISOR_ORDER
    }

    /// Wrap a unary invocation: mutate the request, delegate to `chain`,
    /// mutate the response.
    async fn advise_call(
        &self,
        request: AdvisedRequest,
        chain: &dyn CallAdvisorChain,
    ) -> Result<AdvisedResponse>;
}

/// An advisor wrapping the streaming invocation shape.
#[async_trait]
pub trait StreamAdvisor: Send + Sync + std::fmt::Debug {
    /// Get a human-readable name for this advisor.
    fn name(&self) -> &'static str;

    /// Execution order within the chain; lower runs first on the request
    /// path.
    fn order(&self) -> i32 {
        DEFAULT_ADVISOR_ORDER
    }

    /// Wrap a streaming invocation. The before-transform runs once at
    /// stream start; fragment handling must not buffer the stream.
    async fn advise_stream(
        &self,
        request: AdvisedRequest,
        chain: &dyn StreamAdvisorChain,
    ) -> Result<AdvisedResponseStream>;
}

/// The remainder of the chain, as seen by a unary advisor.
#[async_trait]
pub trait CallAdvisorChain: Send + Sync {
    /// Forward the request to the next link (ultimately the model).
    async fn next_call(&self, request: AdvisedRequest) -> Result<AdvisedResponse>;
}

/// The remainder of the chain, as seen by a streaming advisor.
#[async_trait]
pub trait StreamAdvisorChain: Send + Sync {
    /// Forward the request to the next link (ultimately the model),
    /// producing a lazy fragment stream.
    async fn next_stream(&self, request: AdvisedRequest) -> Result<AdvisedResponseStream>;
}
