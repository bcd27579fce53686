//! Retrieval orchestration: embed → scan → blend → personalize.
//!
//! [`retrieve`] is the single entry point the CLI uses. The query embedding
//! is produced by the caller (the embedding engine is sync; callers wrap it
//! in `spawn_blocking`), everything else happens here.

use sav_core::entities::Interest;
use sav_db::service::SavService;

use crate::error::RetrievalError;
use crate::fts::fts_search;
use crate::hybrid::{HybridHit, combine_results};
use crate::optimizer::ReplayCase;
use crate::params::RetrievalParams;
use crate::personalize::apply_personalization;
use crate::vector::{VectorFilters, vector_scan};

/// Overscan factor applied before min-score filtering and personalization,
/// so boosting can promote hits that would otherwise be cut at the limit.
const OVERSCAN: u32 = 4;

/// Run a full retrieval pass.
///
/// 1. Cosine scan over all embedded chunks.
/// 2. FTS5 keyword search.
/// 3. Alpha-blend and dedup ([`combine_results`]).
/// 4. Drop hits below `min_score`.
/// 5. Personalize with the profile's interests and re-rank.
/// 6. Truncate to `limit`.
///
/// # Errors
///
/// Returns [`RetrievalError::InvalidQuery`] for an empty query, or
/// [`RetrievalError::Database`] if chunk loading or FTS fails.
pub async fn retrieve(
    service: &SavService,
    query: &str,
    query_embedding: &[f32],
    interests: &[Interest],
    params: &RetrievalParams,
) -> Result<Vec<HybridHit>, RetrievalError> {
    if query.trim().is_empty() {
        return Err(RetrievalError::InvalidQuery(
            "search query cannot be empty".to_string(),
        ));
    }
    let params = params.clamped();
    let overscan_limit = params.limit.saturating_mul(OVERSCAN);

    let records = service.chunk_records(None).await?;
    let vector_hits = vector_scan(
        &records,
        query_embedding,
        &VectorFilters {
            limit: overscan_limit,
            ..Default::default()
        },
    );
    let fts_hits = fts_search(service, query, overscan_limit).await?;

    tracing::debug!(
        query,
        candidates = records.len(),
        vector_hits = vector_hits.len(),
        fts_hits = fts_hits.len(),
        "retrieval scan complete"
    );

    let mut hits = combine_results(&vector_hits, &fts_hits, params.alpha, overscan_limit);
    hits.retain(|h| h.combined_score >= params.min_score);
    apply_personalization(&mut hits, interests, params.gamma);

    #[allow(clippy::cast_possible_truncation)]
    hits.truncate(params.limit as usize);
    Ok(hits)
}

/// Precompute one optimizer replay case for a recorded query.
///
/// Vector and FTS hits are parameter-independent, so they are computed once
/// here and re-blended cheaply on every objective evaluation.
///
/// # Errors
///
/// Returns [`RetrievalError::Database`] if chunk loading or FTS fails.
pub async fn build_replay_case(
    service: &SavService,
    query: &str,
    query_embedding: &[f32],
    relevant_chunk_ids: Vec<String>,
    limit: u32,
) -> Result<ReplayCase, RetrievalError> {
    let records = service.chunk_records(None).await?;
    let vector_hits = vector_scan(
        &records,
        query_embedding,
        &VectorFilters {
            limit: limit.saturating_mul(OVERSCAN),
            ..Default::default()
        },
    );
    let fts_hits = fts_search(service, query, limit.saturating_mul(OVERSCAN)).await?;

    Ok(ReplayCase {
        query: query.to_string(),
        vector_hits,
        fts_hits,
        relevant_chunk_ids,
    })
}
