//! Hybrid search combining vector similarity and FTS5 relevance.
//!
//! Uses configurable alpha blending to merge results from the cosine scan
//! and FTS5 keyword search. Handles score normalization, deduplication by
//! chunk ID, and ranking.
//!
//! Alpha controls the blend:
//! - `0.0` = FTS only
//! - `1.0` = vector only
//! - `0.7` (default) = favors semantic similarity

use std::collections::HashMap;

use crate::fts::FtsHit;
use crate::vector::VectorHit;

/// Result from a hybrid search combining vector and FTS hits.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HybridHit {
    /// Chunk ID.
    pub chunk_id: String,
    /// Owning document ID.
    pub document_id: String,
    /// Owning document title.
    pub document_title: String,
    /// Chunk text content.
    pub content: String,
    /// Normalized vector similarity score (if present).
    pub vector_score: Option<f64>,
    /// FTS relevance score (if present).
    pub fts_score: Option<f64>,
    /// Alpha-blended combined score, before personalization.
    pub combined_score: f64,
}

/// Normalize a cosine similarity score from [-1, 1] to [0, 1].
pub(crate) const fn normalize_vector_score(score: f64) -> f64 {
    f64::midpoint(score, 1.0)
}

/// Combine vector and FTS hits with alpha blending.
///
/// `alpha` controls the blend: `0.0` = FTS only, `1.0` = vector only.
/// Hits are deduplicated by chunk ID and ranked by combined score.
///
/// # Arguments
///
/// * `vector_hits` — Hits from the cosine scan.
/// * `fts_hits` — Hits from FTS5 search.
/// * `alpha` — Blending weight: `0.0` (FTS only) to `1.0` (vector only).
/// * `limit` — Maximum number of hits to return.
#[must_use]
pub fn combine_results(
    vector_hits: &[VectorHit],
    fts_hits: &[FtsHit],
    alpha: f64,
    limit: u32,
) -> Vec<HybridHit> {
    let alpha = alpha.clamp(0.0, 1.0);

    // Dedup key (chunk ID) -> accumulated result
    let mut merged: HashMap<String, HybridHit> = HashMap::new();

    for vh in vector_hits {
        let norm_score = normalize_vector_score(vh.score);

        let entry = merged
            .entry(vh.chunk_id.clone())
            .or_insert_with(|| HybridHit {
                chunk_id: vh.chunk_id.clone(),
                document_id: vh.document_id.clone(),
                document_title: vh.document_title.clone(),
                content: vh.content.clone(),
                vector_score: None,
                fts_score: None,
                combined_score: 0.0,
            });
        entry.vector_score = Some(norm_score);
        entry.combined_score = alpha * norm_score + (1.0 - alpha) * entry.fts_score.unwrap_or(0.0);
    }

    for fh in fts_hits {
        let entry = merged
            .entry(fh.chunk_id.clone())
            .or_insert_with(|| HybridHit {
                chunk_id: fh.chunk_id.clone(),
                document_id: fh.document_id.clone(),
                document_title: fh.document_title.clone(),
                content: fh.content.clone(),
                vector_score: None,
                fts_score: None,
                combined_score: 0.0,
            });
        entry.fts_score = Some(fh.relevance);
        entry.combined_score =
            alpha * entry.vector_score.unwrap_or(0.0) + (1.0 - alpha) * fh.relevance;
    }

    let mut results: Vec<HybridHit> = merged.into_values().collect();
    results.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    #[allow(clippy::cast_possible_truncation)]
    results.truncate(limit as usize);
    results
}
