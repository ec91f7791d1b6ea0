//! Request and response envelopes flowing through the advisor chain.
//!
//! The advise context is the only mutable state shared between the before
//! and after hooks of an advisor. It is copied (never aliased) at every
//! stage, so nothing leaks across concurrent invocations.

use std::collections::HashMap;

use crate::error::{RagweaveError, Result};
use crate::types::chat::{ChatResponse, Prompt};
use crate::types::query::ChatTurn;

/// The request envelope flowing down the advisor chain toward the model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdvisedRequest {
    /// Text of the current user message.
    pub user_text: String,

    /// Optional system instruction.
    pub system_text: Option<String>,

    /// Prior conversational turns, oldest first.
    pub history: Vec<ChatTurn>,

    /// Values surviving across an advisor's before/after boundary, keyed by
    /// string. Copied into each stage.
    pub advise_context: HashMap<String, serde_json::Value>,
}

impl AdvisedRequest {
    /// Create a builder for constructing advised requests.
    #[must_use]
    pub fn builder() -> AdvisedRequestBuilder {
        AdvisedRequestBuilder::default()
    }

    /// Create a builder pre-populated from this request.
    #[must_use]
    pub fn mutate(&self) -> AdvisedRequestBuilder {
        AdvisedRequestBuilder {
            user_text: Some(self.user_text.clone()),
            system_text: self.system_text.clone(),
            history: self.history.clone(),
            advise_context: self.advise_context.clone(),
        }
    }

    /// Convert this request into the prompt handed to the model: system
    /// instruction, then history, then the current user message.
    pub fn to_prompt(&self) -> Prompt {
        let mut messages = self.history.clone();
        messages.push(ChatTurn::user(self.user_text.clone()));
        Prompt {
            system: self.system_text.clone(),
            messages,
        }
    }
}

/// Builder for [`AdvisedRequest`], validated eagerly at
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct AdvisedRequestBuilder {
    user_text: Option<String>,
    system_text: Option<String>,
    history: Vec<ChatTurn>,
    advise_context: HashMap<String, serde_json::Value>,
}

impl AdvisedRequestBuilder {
    /// Set the current user message text.
    #[must_use]
    pub fn user_text<S: Into<String>>(mut self, text: S) -> Self {
        self.user_text = Some(text.into());
        self
    }

    /// Set the system instruction.
    #[must_use]
    pub fn system_text<S: Into<String>>(mut self, text: S) -> Self {
        self.system_text = Some(text.into());
        self
    }

    /// Set the conversation history.
    #[must_use]
    pub fn history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    /// Add a single advise-context entry.
    #[must_use]
    pub fn context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.advise_context.insert(key.into(), value.into());
        self
    }

    /// Replace the whole advise context.
    #[must_use]
    pub fn advise_context(mut self, context: HashMap<String, serde_json::Value>) -> Self {
        self.advise_context = context;
        self
    }

    /// Build the advised request.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if neither user text nor history is
    /// supplied.
    pub fn build(self) -> Result<AdvisedRequest> {
        let user_text = self.user_text.unwrap_or_default();
        if user_text.trim().is_empty() && self.history.is_empty() {
            return Err(RagweaveError::configuration(
                "advised request requires user text or conversation history",
            ));
        }

        Ok(AdvisedRequest {
            user_text,
            system_text: self.system_text,
            history: self.history,
            advise_context: self.advise_context,
        })
    }
}

/// The response envelope flowing back up the advisor chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdvisedResponse {
    /// The model response (or stream fragment).
    pub response: ChatResponse,

    /// The advise context carried over from the request side.
    pub advise_context: HashMap<String, serde_json::Value>,
}

impl AdvisedResponse {
    /// Create a new advised response.
    pub fn new(
        response: ChatResponse,
        advise_context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            response,
            advise_context,
        }
    }

    /// Look up an advise-context value by key.
    pub fn context_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.advise_context.get(key)
    }

    /// Produce a copy of this envelope with a different response.
    #[must_use]
    pub fn with_response(&self, response: ChatResponse) -> Self {
        Self {
            response,
            advise_context: self.advise_context.clone(),
        }
    }
}
