//! The retrieval-augmentation advisor.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::StreamExt;
use ragweave_core::{
    AdvisedRequest, AdvisedResponse, Query, RagweaveError, Result, RETRIEVED_DOCUMENTS_KEY,
};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{
    AdvisedResponseStream, CallAdvisor, CallAdvisorChain, StreamAdvisor, StreamAdvisorChain,
    DEFAULT_ADVISOR_ORDER,
};
use crate::pipeline::RetrievalPipeline;

/// Advisor that runs a [`RetrievalPipeline`] before the model invocation
/// and attaches the retrieved documents to the response metadata after it.
///
/// The before-phase builds a [`Query`] from the advised request (user text,
/// history, a copy of the advise context), executes the pipeline, stores
/// the joined documents in the advise context under
/// [`RETRIEVED_DOCUMENTS_KEY`], and replaces the user text with the
/// augmented query.
///
/// In the streaming shape, the before-phase runs exactly once at stream
/// start. With `protect_from_blocking` (the default) it is dispatched onto
/// a dedicated task so a cooperative caller is not starved by blocking
/// retrieval work; the task is aborted if the outer stream is dropped, so
/// cancellation propagates to the retrieval calls. Fragments then pass
/// through untouched, in order and unbuffered; only the terminal fragment
/// receives the metadata attachment. A stream that ends without a terminal
/// fragment yields a final stream-integrity error instead of silently
/// returning un-augmented data.
#[derive(Debug)]
pub struct RetrievalAugmentationAdvisor {
    pipeline: Arc<RetrievalPipeline>,
    protect_from_blocking: bool,
    order: i32,
}

impl RetrievalAugmentationAdvisor {
    /// Create an advisor with the given pipeline, blocking protection on,
    /// and default order.
    pub fn new(pipeline: Arc<RetrievalPipeline>) -> Self {
        Self {
            pipeline,
            protect_from_blocking: true,
            order: DEFAULT_ADVISOR_ORDER,
        }
    }

    /// Create a builder for constructing advisors.
    #[must_use]
    pub fn builder() -> RetrievalAugmentationAdvisorBuilder {
        RetrievalAugmentationAdvisorBuilder::default()
    }

    /// The before-phase: run the pipeline and rewrite the request.
    ///
    /// Associated function (not a method) so the streaming shape can move
    /// it onto a dedicated task.
    async fn augment_request(
        pipeline: Arc<RetrievalPipeline>,
        request: AdvisedRequest,
    ) -> Result<AdvisedRequest> {
        // Fresh copy per call; nothing is shared across invocations.
        let mut context = request.advise_context.clone();

        let query = Query::builder()
            .text(request.user_text.clone())
            .history(request.history.clone())
            .context_map(context.clone())
            .build();

        let outcome = pipeline.process(query).await?;

        context.insert(
            RETRIEVED_DOCUMENTS_KEY.to_string(),
            serde_json::to_value(&outcome.documents)?,
        );

        debug!(
            documents = outcome.documents.len(),
            "Augmented advised request with retrieved context"
        );

        request
            .mutate()
            .user_text(outcome.query.text)
            .advise_context(context)
            .build()
    }

    /// The after-phase: copy the retrieved-document list from the advise
    /// context into the response metadata. The model-generated text is
    /// never altered.
    fn attach_retrieval_metadata(advised: AdvisedResponse) -> AdvisedResponse {
        match advised.advise_context.get(RETRIEVED_DOCUMENTS_KEY) {
            Some(documents) => {
                let response = advised
                    .response
                    .clone()
                    .with_metadata(RETRIEVED_DOCUMENTS_KEY, documents.clone());
                advised.with_response(response)
            }
            None => advised,
        }
    }

    /// Pass fragments through untouched, attach metadata to the terminal
    /// fragment, and surface a stream that ends without one as a
    /// stream-integrity error.
    fn attach_on_terminal(inner: AdvisedResponseStream) -> AdvisedResponseStream {
        let state = TerminalState {
            inner,
            terminal_seen: false,
            done: false,
        };

        Box::pin(futures::stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(advised)) if advised.response.is_terminal() => {
                    state.terminal_seen = true;
                    Some((Ok(Self::attach_retrieval_metadata(advised)), state))
                }
                Some(Ok(advised)) => Some((Ok(advised), state)),
                Some(Err(error)) => {
                    state.done = true;
                    Some((Err(error), state))
                }
                None if state.terminal_seen => None,
                None => {
                    state.done = true;
                    Some((
                        Err(RagweaveError::stream_integrity(
                            "response stream ended without a terminal fragment",
                        )),
                        state,
                    ))
                }
            }
        }))
    }
}

struct TerminalState {
    inner: AdvisedResponseStream,
    terminal_seen: bool,
    done: bool,
}

#[async_trait]
impl CallAdvisor for RetrievalAugmentationAdvisor {
    fn name(&self) -> &'static str {
        "RetrievalAugmentationAdvisor"
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn advise_call(
        &self,
        request: AdvisedRequest,
        chain: &dyn CallAdvisorChain,
    ) -> Result<AdvisedResponse> {
        let request = Self::augment_request(Arc::clone(&self.pipeline), request).await?;
        let response = chain.next_call(request).await?;
        Ok(Self::attach_retrieval_metadata(response))
    }
}

#[async_trait]
impl StreamAdvisor for RetrievalAugmentationAdvisor {
    fn name(&self) -> &'static str {
        "RetrievalAugmentationAdvisor"
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn advise_stream(
        &self,
        request: AdvisedRequest,
        chain: &dyn StreamAdvisorChain,
    ) -> Result<AdvisedResponseStream> {
        // One suspension point per streaming invocation, before the
        // downstream chain resumes — never per fragment.
        let request = if self.protect_from_blocking {
            let pipeline = Arc::clone(&self.pipeline);
            AbortOnDrop::new(tokio::spawn(Self::augment_request(pipeline, request)))
                .await
                .map_err(|e| {
                    RagweaveError::internal(format!("retrieval task failed to complete: {e}"))
                })??
        } else {
            Self::augment_request(Arc::clone(&self.pipeline), request).await?
        };

        let stream = chain.next_stream(request).await?;
        Ok(Self::attach_on_terminal(stream))
    }
}

/// Builder for [`RetrievalAugmentationAdvisor`], validated eagerly at
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RetrievalAugmentationAdvisorBuilder {
    pipeline: Option<Arc<RetrievalPipeline>>,
    protect_from_blocking: Option<bool>,
    order: Option<i32>,
}

impl RetrievalAugmentationAdvisorBuilder {
    /// Set the retrieval pipeline (required).
    #[must_use]
    pub fn pipeline(mut self, pipeline: Arc<RetrievalPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set whether the streaming before-phase is dispatched onto a
    /// dedicated task. Default `true`; a no-op for callers whose execution
    /// model has no blocking constraint.
    #[must_use]
    pub fn protect_from_blocking(mut self, protect: bool) -> Self {
        self.protect_from_blocking = Some(protect);
        self
    }

    /// Set the advisor's execution order. Default 0.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Build the advisor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no pipeline was supplied.
    pub fn build(self) -> Result<RetrievalAugmentationAdvisor> {
        let pipeline = self.pipeline.ok_or_else(|| {
            RagweaveError::configuration("retrieval augmentation advisor requires a pipeline")
        })?;

        Ok(RetrievalAugmentationAdvisor {
            pipeline,
            protect_from_blocking: self.protect_from_blocking.unwrap_or(true),
            order: self.order.unwrap_or(DEFAULT_ADVISOR_ORDER),
        })
    }
}

/// A join handle that aborts its task when dropped, so cancelling the
/// outer stream cancels the retrieval work dispatched in the before-phase.
#[derive(Debug)]
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    fn new(handle: JoinHandle<T>) -> Self {
        Self(handle)
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = std::result::Result<T, tokio::task::JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
