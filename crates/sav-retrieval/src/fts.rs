//! Full-text search adapter over the sav-db FTS5 index.
//!
//! Thin wrapper that queries `doc_chunks_fts` via `SavService` and
//! normalizes results into a uniform [`FtsHit`] with positional relevance.
//!
//! FTS5 uses porter stemming: "retrieving" matches "retrieval", "embedding"
//! matches "embeddings".

use sav_db::service::SavService;

use crate::error::RetrievalError;

/// Result from an FTS5 full-text search.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FtsHit {
    /// Chunk ID.
    pub chunk_id: String,
    /// Owning document ID.
    pub document_id: String,
    /// Owning document title.
    pub document_title: String,
    /// Chunk text content.
    pub content: String,
    /// Positional relevance in `(0, 1]` (1.0 = best FTS5 rank).
    pub relevance: f64,
}

/// Search chunk content via FTS5.
///
/// The database returns results ordered by FTS5 rank; positions are mapped
/// to relevance scores so position 0 gets 1.0 and the last position
/// approaches 0.0.
///
/// # Errors
///
/// Returns [`RetrievalError::InvalidQuery`] if the query is empty.
/// Returns [`RetrievalError::Database`] if the FTS5 query fails.
pub async fn fts_search(
    service: &SavService,
    query: &str,
    limit: u32,
) -> Result<Vec<FtsHit>, RetrievalError> {
    if query.trim().is_empty() {
        return Err(RetrievalError::InvalidQuery(
            "search query cannot be empty".to_string(),
        ));
    }

    let records = service.search_chunks_fts(query, limit).await?;
    let total = records.len();

    #[allow(clippy::cast_precision_loss)]
    let hits = records
        .into_iter()
        .enumerate()
        .map(|(i, r)| FtsHit {
            chunk_id: r.chunk.id,
            document_id: r.chunk.document_id,
            document_title: r.document_title,
            content: r.chunk.content,
            relevance: (total - i) as f64 / total as f64,
        })
        .collect();

    Ok(hits)
}
