//! Personalization layer over hybrid search results.
//!
//! Multiplies each hit's combined score by an interest-affinity boost:
//!
//! ```text
//! personalized = combined * (1 + gamma * affinity)
//! ```
//!
//! Affinity is the weight-normalized overlap between a profile's interest
//! keywords and the hit content, in `[0, 1]`. With `gamma = 0` ranking is
//! unchanged; interests a researcher never expressed cannot demote a hit
//! below its unpersonalized score.
//!
//! The reverse loop — feedback nudging interest weights — lives in
//! [`apply_feedback`].

use sav_core::entities::Interest;
use sav_core::enums::FeedbackAction;
use sav_db::service::SavService;

use crate::error::RetrievalError;
use crate::hybrid::HybridHit;

/// Fraction of the feedback reward applied to each matching interest weight.
const LEARNING_RATE: f64 = 0.1;

/// Weight-normalized interest-keyword overlap with `content`, in `[0, 1]`.
///
/// An interest matches when its keyword appears as a substring of the
/// lowercased content. With no interests (or all-zero weights) the affinity
/// is 0.
#[must_use]
pub fn interest_affinity(content: &str, interests: &[Interest]) -> f64 {
    let total: f64 = interests.iter().map(|i| i.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let content = content.to_lowercase();
    let matched: f64 = interests
        .iter()
        .filter(|i| content.contains(&i.keyword))
        .map(|i| i.weight)
        .sum();

    matched / total
}

/// Re-rank hybrid hits by multiplying in the personalization boost.
///
/// `gamma` is clamped to `[0, 1]`. Hits are re-sorted by the boosted score.
pub fn apply_personalization(hits: &mut Vec<HybridHit>, interests: &[Interest], gamma: f64) {
    let gamma = gamma.clamp(0.0, 1.0);
    if gamma == 0.0 || interests.is_empty() {
        return;
    }

    for hit in hits.iter_mut() {
        let affinity = interest_affinity(&hit.content, interests);
        hit.combined_score *= 1.0 + gamma * affinity;
    }

    hits.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Nudge a profile's interest weights from a feedback event.
///
/// Every interest keyword found in the chunk content is bumped by
/// `reward * LEARNING_RATE` (negative for dismissals). Returns the
/// keywords that were nudged.
///
/// # Errors
///
/// Returns [`RetrievalError::Database`] if reading or writing interests fails.
pub async fn apply_feedback(
    service: &SavService,
    profile_id: &str,
    chunk_content: &str,
    action: FeedbackAction,
) -> Result<Vec<String>, RetrievalError> {
    let interests = service.interests(profile_id).await?;
    let content = chunk_content.to_lowercase();
    let delta = action.reward() * LEARNING_RATE;

    let mut nudged = Vec::new();
    for interest in interests {
        if content.contains(&interest.keyword) {
            service
                .bump_interest(profile_id, &interest.keyword, delta)
                .await?;
            nudged.push(interest.keyword);
        }
    }

    tracing::debug!(
        profile = profile_id,
        action = %action,
        nudged = nudged.len(),
        "applied feedback to interest weights"
    );
    Ok(nudged)
}
