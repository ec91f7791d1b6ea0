//! Query types and conversation history.
//!
//! A [`Query`] is the user's information need as it flows through the
//! retrieval pipeline. Queries are immutable value types: every
//! transformation produces a new `Query`, never mutates one in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single turn in the conversation history attached to a query.
///
/// History is read-only context for query transformers (e.g. the
/// compression transformer collapses it into a standalone query).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatTurn {
    /// A message authored by the user.
    User(String),

    /// A message authored by the assistant.
    Assistant(String),
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::User(text.into())
    }

    /// Create an assistant turn.
    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Self::Assistant(text.into())
    }

    /// Get the text carried by this turn.
    pub fn text(&self) -> &str {
        match self {
            Self::User(text) | Self::Assistant(text) => text,
        }
    }

    /// Check if this turn was authored by the user.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Role label used when rendering history into a prompt.
    pub fn role(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
        }
    }
}

/// A structured query flowing through the retrieval pipeline.
///
/// # Examples
///
/// ```rust
/// use ragweave_core::types::{ChatTurn, Query};
///
/// let query = Query::builder()
///     .text("What is the capital of Denmark?")
///     .history(vec![ChatTurn::user("Let's talk about Europe.")])
///     .context("tenant", "acme")
///     .build();
///
/// assert_eq!(query.text, "What is the capital of Denmark?");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    /// The query text. Never absent; the empty string is permitted.
    pub text: String,

    /// Prior conversational turns, oldest first.
    pub history: Vec<ChatTurn>,

    /// Opaque per-call values threaded through the pipeline, keyed by
    /// string. Reserved keys (e.g. the per-call filter expression) live in
    /// [`crate::types::retrieval`].
    pub context: HashMap<String, serde_json::Value>,
}

impl Query {
    /// Create a new query with the given text and no history or context.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            history: Vec::new(),
            context: HashMap::new(),
        }
    }

    /// Create a builder for constructing queries with a fluent API.
    #[must_use]
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Produce a new query with different text, keeping history and context.
    ///
    /// This is the copy-on-transform primitive used by query transformers.
    #[must_use]
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Self {
            text: text.into(),
            history: self.history.clone(),
            context: self.context.clone(),
        }
    }

    /// Produce a new query with an additional context entry.
    #[must_use]
    pub fn with_context<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        let mut next = self.clone();
        next.context.insert(key.into(), value.into());
        next
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }

    /// Check if the query carries conversation history.
    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}

/// Builder for creating queries with a fluent API.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    text: Option<String>,
    history: Vec<ChatTurn>,
    context: HashMap<String, serde_json::Value>,
}

impl QueryBuilder {
    /// Set the query text.
    #[must_use]
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the conversation history.
    #[must_use]
    pub fn history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    /// Add a single context entry.
    #[must_use]
    pub fn context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Set the whole context map at once.
    #[must_use]
    pub fn context_map(mut self, context: HashMap<String, serde_json::Value>) -> Self {
        self.context = context;
        self
    }

    /// Build the query. Missing text defaults to the empty string.
    #[must_use]
    pub fn build(self) -> Query {
        Query {
            text: self.text.unwrap_or_default(),
            history: self.history,
            context: self.context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let query = Query::new("test query");
        assert_eq!(query.text, "test query");
        assert!(!query.has_history());
        assert!(query.context.is_empty());
    }

    #[test]
    fn test_query_builder() {
        let query = Query::builder()
            .text("test query")
            .history(vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")])
            .context("lang", "en")
            .build();

        assert_eq!(query.text, "test query");
        assert!(query.has_history());
        assert_eq!(
            query.context_value("lang"),
            Some(&serde_json::Value::String("en".into()))
        );
    }

    #[test]
    fn test_with_text_preserves_history_and_context() {
        let query = Query::builder()
            .text("original")
            .history(vec![ChatTurn::user("hi")])
            .context("k", 1)
            .build();

        let rewritten = query.with_text("rewritten");
        assert_eq!(rewritten.text, "rewritten");
        assert_eq!(rewritten.history, query.history);
        assert_eq!(rewritten.context, query.context);
        // Original is untouched.
        assert_eq!(query.text, "original");
    }

    #[test]
    fn test_chat_turn() {
        let turn = ChatTurn::user("hi");
        assert!(turn.is_user());
        assert_eq!(turn.text(), "hi");
        assert_eq!(turn.role(), "user");
        assert_eq!(ChatTurn::assistant("yo").role(), "assistant");
    }

    #[test]
    fn test_missing_text_defaults_to_empty() {
        let query = Query::builder().build();
        assert_eq!(query.text, "");
    }
}
