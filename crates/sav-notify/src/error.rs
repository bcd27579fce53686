//! Notification error types for sav-notify.

use thiserror::Error;

/// Errors from notification dispatch and queue operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Error from the libSQL database (queue state).
    #[error("database error: {0}")]
    Database(#[from] sav_db::error::DatabaseError),

    /// HTTP transport error during webhook delivery.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Delivery was attempted but the receiver rejected it.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// JSONL event journal I/O failed.
    #[error("journal error: {0}")]
    Journal(#[from] std::io::Error),
}
