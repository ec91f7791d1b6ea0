//! Retrieved document type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retrieved unit of context with text, metadata, and an optional
/// relevance score.
///
/// The pipeline only reads `text`, `metadata`, and `score`; documents are
/// never mutated after retrieval. Identity (for joining/deduplication) is
/// the `id` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier of the document.
    pub id: String,

    /// Text content of the document.
    pub text: String,

    /// Document metadata.
    pub metadata: HashMap<String, serde_json::Value>,

    /// Relevance score assigned by the retriever (higher is more relevant).
    pub score: Option<f32>,
}

impl Document {
    /// Create a new document with the given text and a random id.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            metadata: HashMap::new(),
            score: None,
        }
    }

    /// Create a new document with an explicit id.
    pub fn with_id<I, S>(id: I, text: S) -> Self
    where
        I: Into<String>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
            score: None,
        }
    }

    /// Set the relevance score.
    #[must_use]
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
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

    /// Check if the document carries a relevance score.
    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new("some content");
        assert_eq!(doc.text, "some content");
        assert!(!doc.id.is_empty());
        assert!(!doc.has_score());
    }

    #[test]
    fn test_document_with_id_and_score() {
        let doc = Document::with_id("d1", "content")
            .with_score(0.9)
            .with_metadata("source", "wiki");

        assert_eq!(doc.id, "d1");
        assert_eq!(doc.score, Some(0.9));
        assert_eq!(
            doc.metadata.get("source"),
            Some(&serde_json::Value::String("wiki".into()))
        );
    }

    #[test]
    fn test_document_serde_round_trip() {
        let doc = Document::with_id("d1", "content").with_score(0.5);
        let value = serde_json::to_value(&doc).unwrap();
        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }
}
