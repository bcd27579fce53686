//! Funding opportunity matching.
//!
//! Weighted sum of three components:
//! - topic overlap with the profile's interests (weight-normalized)
//! - award size, log-normalized against the largest award in the set
//! - deadline feasibility: 1.0 with `lead_time_days` or more of runway,
//!   ramping linearly to 0.0 at the deadline; closed or past-deadline
//!   opportunities always score 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sav_core::entities::{FundingOpportunity, Interest};
use sav_core::enums::FundingStatus;

use crate::score::{sort_ranked, weighted_topic_overlap};

/// Component weights for funding scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FundingMatchWeights {
    pub topic: f64,
    pub amount: f64,
    pub deadline: f64,
    /// Days of runway considered fully feasible.
    pub lead_time_days: i64,
}

impl Default for FundingMatchWeights {
    fn default() -> Self {
        Self {
            topic: 0.55,
            amount: 0.2,
            deadline: 0.25,
            lead_time_days: 30,
        }
    }
}

/// Per-component contribution, before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FundingScoreBreakdown {
    pub topic_overlap: f64,
    pub amount: f64,
    pub deadline_feasibility: f64,
}

/// A ranked funding opportunity with its total score and breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingScore {
    pub funding_id: String,
    pub title: String,
    pub score: f64,
    pub breakdown: FundingScoreBreakdown,
}

/// Deadline feasibility in `[0, 1]` at time `now`.
///
/// Closed opportunities and past deadlines score 0. A missing deadline
/// (rolling call) scores 1. Otherwise the score ramps linearly from 0 at
/// the deadline up to 1 at `lead_time_days` of remaining runway.
#[must_use]
pub fn deadline_feasibility(
    status: FundingStatus,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lead_time_days: i64,
) -> f64 {
    if status == FundingStatus::Closed {
        return 0.0;
    }
    let Some(deadline) = deadline else {
        return 1.0;
    };
    if deadline <= now {
        return 0.0;
    }

    let remaining_secs = (deadline - now).num_seconds();
    let lead_secs = lead_time_days.max(1) * 86_400;
    #[allow(clippy::cast_precision_loss)]
    let ratio = remaining_secs as f64 / lead_secs as f64;
    ratio.min(1.0)
}

/// Rank funding opportunities against a profile's interests.
///
/// Award sizes are log-normalized (`ln(1 + amount)`) against the largest
/// award in the candidate set, so a 10x bigger grant does not drown out
/// topic fit.
#[must_use]
pub fn match_funding(
    interests: &[Interest],
    opportunities: &[FundingOpportunity],
    weights: &FundingMatchWeights,
    now: DateTime<Utc>,
) -> Vec<FundingScore> {
    let max_log_amount = opportunities
        .iter()
        .filter_map(|o| o.amount)
        .map(|a| (1.0 + a.max(0.0)).ln())
        .fold(0.0_f64, f64::max);

    let mut scores: Vec<FundingScore> = opportunities
        .iter()
        .map(|opp| {
            let topic_overlap = weighted_topic_overlap(interests, &opp.topics);
            let amount = opp.amount.map_or(0.0, |a| {
                if max_log_amount > 0.0 {
                    (1.0 + a.max(0.0)).ln() / max_log_amount
                } else {
                    0.0
                }
            });
            let feasibility =
                deadline_feasibility(opp.status, opp.deadline, now, weights.lead_time_days);

            let score = weights.topic * topic_overlap
                + weights.amount * amount
                + weights.deadline * feasibility;

            FundingScore {
                funding_id: opp.id.clone(),
                title: opp.title.clone(),
                score,
                breakdown: FundingScoreBreakdown {
                    topic_overlap,
                    amount,
                    deadline_feasibility: feasibility,
                },
            }
        })
        .collect();

    sort_ranked(&mut scores, |s| s.score, |s| s.title.clone());
    scores
}
