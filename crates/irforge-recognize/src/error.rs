//! Error types for the recognition pipeline.

use thiserror::Error;

/// Result type alias for recognition operations.
pub type RecognizeResult<T> = Result<T, RecognizeError>;

/// Errors that can occur while recognizing a design tree.
///
/// A declined recognition is *not* an error; it travels as `Ok(None)` and the
/// subtree is simply omitted from the output.
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// A component recognizer failed while processing a node.
    #[error("recognizer '{recognizer}' failed for node {node_id}: {message}")]
    RecognizerFailed {
        recognizer: String,
        node_id: String,
        message: String,
    },

    /// A custom mapping points at a type outside the closed vocabulary.
    #[error("invalid component mapping: {message}")]
    InvalidMapping { message: String },

    /// Serialization error while assembling props or prompts.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
