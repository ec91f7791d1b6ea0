//! Error types for the Ragweave framework.
//!
//! The error taxonomy follows the failure modes of a retrieval-augmented
//! generation run: query transformation, document retrieval, pipeline
//! configuration, and stream integrity. No error is ever downgraded to an
//! empty result inside the core; every failure surfaces to the caller.

use thiserror::Error;

/// Core error types for the Ragweave framework.
#[derive(Error, Debug)]
pub enum RagweaveError {
    /// A query transformer could not produce output (e.g. the upstream
    /// model call failed). Fatal; aborts the invocation before retrieval.
    #[error("Transformation error: {message}")]
    Transformation {
        /// Detailed error message
        message: String,
    },

    /// The document store call failed or timed out. Propagated unchanged,
    /// never retried by this core.
    #[error("Retrieval error: {message}")]
    Retrieval {
        /// Detailed error message
        message: String,
    },

    /// Invalid pipeline or request wiring, detected eagerly at build time.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message
        message: String,
    },

    /// A downstream response stream ended without emitting a terminal
    /// fragment.
    #[error("Stream integrity error: {message}")]
    StreamIntegrity {
        /// Detailed error message
        message: String,
    },

    /// A language model collaborator failed outside of query transformation.
    #[error("Model error: {message}")]
    Model {
        /// Detailed error message
        message: String,
    },

    /// Internal framework errors (task scheduling, invariant violations).
    #[error("Internal error: {message}")]
    Internal {
        /// Detailed error message
        message: String,
    },

    /// I/O related errors from collaborators.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors from external dependencies.
    #[error("External error: {source}")]
    External {
        /// The underlying error
        #[source]
        source: anyhow::Error,
    },
}

impl RagweaveError {
    /// Create a new transformation error with a message.
    pub fn transformation<S: Into<String>>(message: S) -> Self {
        Self::Transformation {
            message: message.into(),
        }
    }

    /// Create a new retrieval error with a message.
    pub fn retrieval<S: Into<String>>(message: S) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    /// Create a new configuration error with a message.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new stream integrity error with a message.
    pub fn stream_integrity<S: Into<String>>(message: S) -> Self {
        Self::StreamIntegrity {
            message: message.into(),
        }
    }

    /// Create a new model error with a message.
    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create a new internal error with a message.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new external error from any error that implements `Into<anyhow::Error>`.
    pub fn external<E: Into<anyhow::Error>>(error: E) -> Self {
        Self::External {
            source: error.into(),
        }
    }

    /// Check if this error was raised before any retrieval happened.
    ///
    /// Returns `true` for configuration and transformation errors, which by
    /// contract abort the invocation before the document store is touched.
    #[must_use]
    pub fn is_pre_retrieval(&self) -> bool {
        matches!(
            self,
            Self::Transformation { .. } | Self::Configuration { .. }
        )
    }

    /// Check if this error is a client error caused by invalid input or
    /// wiring that won't be fixed by retrying.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Convert from `anyhow::Error` to `RagweaveError`.
impl From<anyhow::Error> for RagweaveError {
    fn from(error: anyhow::Error) -> Self {
        Self::External { source: error }
    }
}

/// Result type alias used throughout the Ragweave framework.
pub type Result<T> = std::result::Result<T, RagweaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RagweaveError::transformation("rewrite model unavailable");
        assert!(matches!(err, RagweaveError::Transformation { .. }));
        assert_eq!(
            err.to_string(),
            "Transformation error: rewrite model unavailable"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(RagweaveError::transformation("x").is_pre_retrieval());
        assert!(RagweaveError::configuration("x").is_pre_retrieval());
        assert!(!RagweaveError::retrieval("x").is_pre_retrieval());

        assert!(RagweaveError::configuration("x").is_client_error());
        assert!(!RagweaveError::stream_integrity("x").is_client_error());
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: RagweaveError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, RagweaveError::External { .. }));
    }
}
