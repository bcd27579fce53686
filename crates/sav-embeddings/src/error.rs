//! Embedding error types.

use thiserror::Error;

/// Errors from the embedding engine.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model download or ONNX runtime initialization failed.
    #[error("embedding engine init failed: {0}")]
    InitFailed(String),

    /// ONNX inference failed.
    #[error("embedding failed: {0}")]
    EmbedFailed(String),

    /// The model returned no embeddings for a non-empty input.
    #[error("embedding model returned no result")]
    EmptyResult,
}
