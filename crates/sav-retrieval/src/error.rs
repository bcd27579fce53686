//! Retrieval error types for sav-retrieval.

/// Errors from retrieval operations across vector, FTS, and tuning paths.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Error from the libSQL database (chunk loading, FTS5 queries).
    #[error("database error: {0}")]
    Database(#[from] sav_db::error::DatabaseError),

    /// Error from the embedding engine (fastembed/ONNX).
    #[error("embedding error: {0}")]
    Embedding(#[from] sav_embeddings::EmbeddingError),

    /// Invalid or empty search query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The optimizer has no recorded feedback to replay.
    #[error("no feedback available for tuning")]
    NoFeedback,
}
