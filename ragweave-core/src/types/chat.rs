//! Prompt and chat response types exchanged with the language model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RagweaveError, Result};
use crate::types::query::ChatTurn;

/// A prompt sent to a language model: an optional system instruction plus
/// an ordered list of conversation messages.
///
/// # Examples
///
/// ```rust
/// use ragweave_core::types::Prompt;
///
/// let prompt = Prompt::from_text("What is Rust?");
/// assert_eq!(prompt.user_text(), "What is Rust?");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prompt {
    /// Optional system instruction.
    pub system: Option<String>,

    /// Conversation messages, oldest first.
    pub messages: Vec<ChatTurn>,
}

impl Prompt {
    /// Create a prompt holding a single user message.
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self {
            system: None,
            messages: vec![ChatTurn::user(text)],
        }
    }

    /// Create a builder for constructing prompts.
    #[must_use]
    pub fn builder() -> PromptBuilder {
        PromptBuilder::default()
    }

    /// Text of the last user message, or the empty string if there is none.
    pub fn user_text(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map_or("", ChatTurn::text)
    }

    /// Produce a copy of this prompt with the text of the last user message
    /// replaced. If the prompt has no user message, one is appended.
    #[must_use]
    pub fn augment_user_text<S: Into<String>>(&self, new_text: S) -> Self {
        let mut messages = self.messages.clone();
        match messages.iter().rposition(ChatTurn::is_user) {
            Some(index) => messages[index] = ChatTurn::user(new_text),
            None => messages.push(ChatTurn::user(new_text)),
        }
        Self {
            system: self.system.clone(),
            messages,
        }
    }
}

/// Builder for [`Prompt`], validated eagerly at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct PromptBuilder {
    content: Option<String>,
    messages: Option<Vec<ChatTurn>>,
    system: Option<String>,
}

impl PromptBuilder {
    /// Set raw user content. Mutually exclusive with
    /// [`messages`](Self::messages).
    #[must_use]
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set an explicit message list. Mutually exclusive with
    /// [`content`](Self::content).
    #[must_use]
    pub fn messages(mut self, messages: Vec<ChatTurn>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Set the system instruction.
    #[must_use]
    pub fn system<S: Into<String>>(mut self, system: S) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Build the prompt.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if both raw content and an explicit
    /// message list were supplied.
    pub fn build(self) -> Result<Prompt> {
        let has_content = self.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        let has_messages = self.messages.as_ref().is_some_and(|m| !m.is_empty());

        if has_content && has_messages {
            return Err(RagweaveError::configuration(
                "content and messages cannot be set at the same time",
            ));
        }

        let messages = if has_content {
            vec![ChatTurn::user(self.content.unwrap_or_default())]
        } else {
            self.messages.unwrap_or_default()
        };

        Ok(Prompt {
            system: self.system,
            messages,
        })
    }
}

/// Why a model stopped emitting output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// The model finished naturally.
    Stop,

    /// The output hit a length limit.
    Length,

    /// The output was cut off by a content filter.
    ContentFilter,

    /// Provider-specific reason.
    Other(String),
}

/// A response (or response fragment, when streaming) from the model.
///
/// In a streaming invocation, every fragment is a `ChatResponse`; the
/// fragment carrying a [`FinishReason`] is the terminal one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatResponse {
    /// The model-generated text.
    pub content: String,

    /// Present only on the terminal fragment of a stream (always present on
    /// a unary response).
    pub finish_reason: Option<FinishReason>,

    /// Response metadata. Retrieval metadata is attached here under
    /// [`crate::types::RETRIEVED_DOCUMENTS_KEY`].
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChatResponse {
    /// Create a new response with the given content and no finish reason.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            finish_reason: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the finish reason, marking the response terminal.
    #[must_use]
    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check whether this fragment signals stream completion.
    pub fn is_terminal(&self) -> bool {
        self.finish_reason.is_some()
    }
}
