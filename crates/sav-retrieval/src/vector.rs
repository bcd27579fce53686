//! Vector similarity search over stored chunk embeddings.
//!
//! Brute-force cosine scan over candidates loaded from `sav-db`
//! (`SavService::chunk_records`). The corpus is a researcher's personal
//! document library, so a linear scan is the right tool — no ANN index.

use sav_db::repos::document::ChunkRecord;

/// Result from a vector similarity scan.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VectorHit {
    /// Chunk ID.
    pub chunk_id: String,
    /// Owning document ID.
    pub document_id: String,
    /// Owning document title.
    pub document_title: String,
    /// Chunk text content.
    pub content: String,
    /// Cosine similarity score in `[-1, 1]`.
    pub score: f64,
}

/// Filters for vector scans.
#[derive(Debug, Clone)]
pub struct VectorFilters {
    /// Restrict to chunks of a specific document.
    pub document_id: Option<String>,
    /// Maximum number of hits to return.
    pub limit: u32,
    /// Minimum cosine similarity (hits below are excluded).
    pub min_score: f64,
}

impl Default for VectorFilters {
    fn default() -> Self {
        Self {
            document_id: None,
            limit: 20,
            min_score: -1.0,
        }
    }
}

/// Cosine similarity between two vectors.
///
/// Returns `0.0` for mismatched dimensions or zero-norm inputs, so malformed
/// rows sink to the bottom of the ranking instead of erroring out the scan.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    f64::from(dot / (norm_a * norm_b))
}

/// Scan chunk candidates by cosine similarity against a query embedding.
///
/// Results are ranked by descending score, filtered by `min_score`, and
/// truncated to `limit`.
#[must_use]
pub fn vector_scan(
    records: &[ChunkRecord],
    query_embedding: &[f32],
    filters: &VectorFilters,
) -> Vec<VectorHit> {
    let mut hits: Vec<VectorHit> = records
        .iter()
        .filter(|r| {
            filters
                .document_id
                .as_ref()
                .is_none_or(|d| *d == r.chunk.document_id)
        })
        .map(|r| VectorHit {
            chunk_id: r.chunk.id.clone(),
            document_id: r.chunk.document_id.clone(),
            document_title: r.document_title.clone(),
            content: r.chunk.content.clone(),
            score: cosine_similarity(&r.chunk.embedding, query_embedding),
        })
        .filter(|h| h.score >= filters.min_score)
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    #[allow(clippy::cast_possible_truncation)]
    hits.truncate(filters.limit as usize);
    hits
}
