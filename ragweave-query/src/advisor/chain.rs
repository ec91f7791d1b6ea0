//! The default advisor chain implementation.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use ragweave_core::{AdvisedRequest, AdvisedResponse, ChatModel, RagweaveError, Result};
use tracing::debug;

use super::{
    AdvisedResponseStream, CallAdvisor, CallAdvisorChain, StreamAdvisor, StreamAdvisorChain,
};

/// An ordered advisor chain terminating in a [`ChatModel`].
///
/// Advisors are sorted ascending by order at build time; the terminal link
/// converts the advised request into a prompt and invokes the model. The
/// advise context is copied into every stage, never aliased across
/// concurrent invocations.
///
/// # Examples
///
/// ```rust,no_run
/// use ragweave_query::advisor::AdvisorChain;
/// use ragweave_core::AdvisedRequest;
/// use std::sync::Arc;
///
/// # async fn example(
/// #     model: Arc<dyn ragweave_core::ChatModel>,
/// #     advisor: Arc<ragweave_query::advisor::RetrievalAugmentationAdvisor>,
/// # ) -> ragweave_core::Result<()> {
/// let chain = AdvisorChain::builder()
///     .advisor(advisor)
///     .model(model)
///     .build()?;
///
/// let request = AdvisedRequest::builder().user_text("What is Rust?").build()?;
/// let response = chain.call(request).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AdvisorChain {
    call_advisors: Arc<[Arc<dyn CallAdvisor>]>,
    stream_advisors: Arc<[Arc<dyn StreamAdvisor>]>,
    model: Arc<dyn ChatModel>,
}

impl AdvisorChain {
    /// Create a builder for constructing chains.
    #[must_use]
    pub fn builder() -> AdvisorChainBuilder {
        AdvisorChainBuilder::default()
    }

    /// Run the unary invocation shape through the chain.
    ///
    /// # Errors
    ///
    /// Propagates any advisor or model error unchanged.
    pub async fn call(&self, request: AdvisedRequest) -> Result<AdvisedResponse> {
        let cursor = CallCursor {
            advisors: Arc::clone(&self.call_advisors),
            model: Arc::clone(&self.model),
            position: 0,
        };
        cursor.next_call(request).await
    }

    /// Run the streaming invocation shape through the chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be started; mid-stream
    /// failures surface as `Err` items on the returned stream.
    pub async fn stream(&self, request: AdvisedRequest) -> Result<AdvisedResponseStream> {
        let cursor = StreamCursor {
            advisors: Arc::clone(&self.stream_advisors),
            model: Arc::clone(&self.model),
            position: 0,
        };
        cursor.next_stream(request).await
    }
}

/// Builder for [`AdvisorChain`], validated eagerly at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct AdvisorChainBuilder {
    call_advisors: Vec<Arc<dyn CallAdvisor>>,
    stream_advisors: Vec<Arc<dyn StreamAdvisor>>,
    model: Option<Arc<dyn ChatModel>>,
}

impl AdvisorChainBuilder {
    /// Register an advisor for both invocation shapes.
    #[must_use]
    pub fn advisor<A>(mut self, advisor: Arc<A>) -> Self
    where
        A: CallAdvisor + StreamAdvisor + 'static,
    {
        self.call_advisors.push(advisor.clone());
        self.stream_advisors.push(advisor);
        self
    }

    /// Register an advisor for the unary shape only.
    #[must_use]
    pub fn call_advisor(mut self, advisor: Arc<dyn CallAdvisor>) -> Self {
        self.call_advisors.push(advisor);
        self
    }

    /// Register an advisor for the streaming shape only.
    #[must_use]
    pub fn stream_advisor(mut self, advisor: Arc<dyn StreamAdvisor>) -> Self {
        self.stream_advisors.push(advisor);
        self
    }

    /// Set the terminal model (required).
    #[must_use]
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the chain, sorting advisors ascending by order.
    ///
    /// The sort is stable: advisors with equal order keep registration
    /// order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no model was supplied.
    pub fn build(mut self) -> Result<AdvisorChain> {
        let model = self
            .model
            .ok_or_else(|| RagweaveError::configuration("advisor chain requires a model"))?;

        self.call_advisors.sort_by_key(|a| a.order());
        self.stream_advisors.sort_by_key(|a| a.order());

        debug!(
            call_advisors = self.call_advisors.len(),
            stream_advisors = self.stream_advisors.len(),
            "Built advisor chain"
        );

        Ok(AdvisorChain {
            call_advisors: self.call_advisors.into(),
            stream_advisors: self.stream_advisors.into(),
            model,
        })
    }
}

/// Position of one link in the unary chain. Cheap to clone; each link hands
/// the next position to the advisor it invokes.
#[derive(Debug, Clone)]
struct CallCursor {
    advisors: Arc<[Arc<dyn CallAdvisor>]>,
    model: Arc<dyn ChatModel>,
    position: usize,
}

#[async_trait]
impl CallAdvisorChain for CallCursor {
    async fn next_call(&self, request: AdvisedRequest) -> Result<AdvisedResponse> {
        if let Some(advisor) = self.advisors.get(self.position) {
            debug!(advisor = advisor.name(), "Invoking call advisor");
            let next = Self {
                advisors: Arc::clone(&self.advisors),
                model: Arc::clone(&self.model),
                position: self.position + 1,
            };
            advisor.advise_call(request, &next).await
        } else {
            let prompt = request.to_prompt();
            let response = self.model.call(&prompt).await?;
            Ok(AdvisedResponse::new(response, request.advise_context))
        }
    }
}

/// Position of one link in the streaming chain.
#[derive(Debug, Clone)]
struct StreamCursor {
    advisors: Arc<[Arc<dyn StreamAdvisor>]>,
    model: Arc<dyn ChatModel>,
    position: usize,
}

#[async_trait]
impl StreamAdvisorChain for StreamCursor {
    async fn next_stream(&self, request: AdvisedRequest) -> Result<AdvisedResponseStream> {
        if let Some(advisor) = self.advisors.get(self.position) {
            debug!(advisor = advisor.name(), "Invoking stream advisor");
            let next = Self {
                advisors: Arc::clone(&self.advisors),
                model: Arc::clone(&self.model),
                position: self.position + 1,
            };
            advisor.advise_stream(request, &next).await
        } else {
            let prompt = request.to_prompt();
            let context = request.advise_context;
            let stream = self.model.stream(&prompt).await?;
            Ok(Box::pin(stream.map(move |item| {
                item.map(|response| AdvisedResponse::new(response, context.clone()))
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragweave_core::{ChatResponse, ChatResponseStream, FinishReason, Prompt};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn call(&self, prompt: &Prompt) -> Result<ChatResponse> {
            Ok(ChatResponse::new(prompt.user_text().to_string())
                .with_finish_reason(FinishReason::Stop))
        }

        async fn stream(&self, prompt: &Prompt) -> Result<ChatResponseStream> {
            let response = self.call(prompt).await?;
            Ok(Box::pin(futures::stream::once(async move { Ok(response) })))
        }
    }

    /// Advisor that records its name on entry and tags the request text.
    #[derive(Debug)]
    struct TaggingAdvisor {
        tag: &'static str,
        order: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl CallAdvisor for TaggingAdvisor {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn order(&self) -> i32 {
            self.order
        }

        async fn advise_call(
            &self,
            request: AdvisedRequest,
            chain: &dyn CallAdvisorChain,
        ) -> Result<AdvisedResponse> {
            self.log.lock().unwrap().push(self.tag);
            let tagged = request
                .mutate()
                .user_text(format!("{} [{}]", request.user_text, self.tag))
                .build()?;
            chain.next_call(tagged).await
        }
    }

    #[tokio::test]
    async fn test_chain_requires_model() {
        let err = AdvisorChain::builder().build().unwrap_err();
        assert!(matches!(err, RagweaveError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_advisors_sorted_by_order_on_request_path() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = AdvisorChain::builder()
            .call_advisor(Arc::new(TaggingAdvisor {
                tag: "second",
                order: 10,
                log: log.clone(),
            }))
            .call_advisor(Arc::new(TaggingAdvisor {
                tag: "first",
                order: -10,
                log: log.clone(),
            }))
            .model(Arc::new(EchoModel))
            .build()
            .unwrap();

        let request = AdvisedRequest::builder().user_text("q").build().unwrap();
        let response = chain.call(request).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        // Request-path mutations applied in order.
        assert_eq!(response.response.content, "q [first] [second]");
    }

    #[tokio::test]
    async fn test_empty_chain_reaches_model() {
        let chain = AdvisorChain::builder()
            .model(Arc::new(EchoModel))
            .build()
            .unwrap();

        let request = AdvisedRequest::builder().user_text("hello").build().unwrap();
        let response = chain.call(request).await.unwrap();
        assert_eq!(response.response.content, "hello");
        assert!(response.response.is_terminal());
    }

    #[tokio::test]
    async fn test_stream_terminal_link_carries_context() {
        let chain = AdvisorChain::builder()
            .model(Arc::new(EchoModel))
            .build()
            .unwrap();

        let request = AdvisedRequest::builder()
            .user_text("hello")
            .context("k", "v")
            .build()
            .unwrap();

        let mut stream = chain.stream(request).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.response.content, "hello");
        assert_eq!(
            first.context_value("k"),
            Some(&serde_json::Value::String("v".into()))
        );
        assert!(stream.next().await.is_none());
    }
}
