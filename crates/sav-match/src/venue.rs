//! Publication venue matching.
//!
//! Weighted sum of four components:
//! - topic overlap with the profile's interests (weight-normalized)
//! - impact factor, normalized against the best impact in the candidate set
//! - acceptance attractiveness (`1 - acceptance_rate`; unknown rates score 0)
//! - open-access bonus

use serde::{Deserialize, Serialize};

use sav_core::entities::{Interest, PublicationVenue};

use crate::score::{sort_ranked, weighted_topic_overlap};

/// Component weights for venue scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VenueMatchWeights {
    pub topic: f64,
    pub impact: f64,
    pub acceptance: f64,
    pub open_access_bonus: f64,
}

impl Default for VenueMatchWeights {
    fn default() -> Self {
        Self {
            topic: 0.5,
            impact: 0.25,
            acceptance: 0.15,
            open_access_bonus: 0.1,
        }
    }
}

/// Per-component contribution, before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VenueScoreBreakdown {
    pub topic_overlap: f64,
    pub impact: f64,
    pub acceptance: f64,
    pub open_access: f64,
}

/// A ranked venue with its total score and component breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueScore {
    pub venue_id: String,
    pub name: String,
    pub score: f64,
    pub breakdown: VenueScoreBreakdown,
}

/// Rank venues against a profile's interests.
///
/// Impact factors are normalized against the highest impact factor in the
/// candidate set, so scores are comparable only within one ranking call.
#[must_use]
pub fn match_venues(
    interests: &[Interest],
    venues: &[PublicationVenue],
    weights: &VenueMatchWeights,
) -> Vec<VenueScore> {
    let max_impact = venues
        .iter()
        .filter_map(|v| v.impact_factor)
        .fold(0.0_f64, f64::max);

    let mut scores: Vec<VenueScore> = venues
        .iter()
        .map(|venue| {
            let topic_overlap = weighted_topic_overlap(interests, &venue.topics);
            let impact = venue.impact_factor.map_or(0.0, |f| {
                if max_impact > 0.0 { f / max_impact } else { 0.0 }
            });
            let acceptance = venue
                .acceptance_rate
                .map_or(0.0, |r| (1.0 - r).clamp(0.0, 1.0));
            let open_access = if venue.open_access { 1.0 } else { 0.0 };

            let score = weights.topic * topic_overlap
                + weights.impact * impact
                + weights.acceptance * acceptance
                + weights.open_access_bonus * open_access;

            VenueScore {
                venue_id: venue.id.clone(),
                name: venue.name.clone(),
                score,
                breakdown: VenueScoreBreakdown {
                    topic_overlap,
                    impact,
                    acceptance,
                    open_access,
                },
            }
        })
        .collect();

    sort_ranked(&mut scores, |s| s.score, |s| s.name.clone());
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sav_core::enums::VenueKind;

    fn interest(keyword: &str, weight: f64) -> Interest {
        Interest {
            profile_id: "prf-test0001".to_string(),
            keyword: keyword.to_string(),
            weight,
            updated_at: Utc::now(),
        }
    }

    fn venue(
        id: &str,
        name: &str,
        topics: &[&str],
        impact_factor: Option<f64>,
        acceptance_rate: Option<f64>,
        open_access: bool,
    ) -> PublicationVenue {
        PublicationVenue {
            id: id.to_string(),
            name: name.to_string(),
            kind: VenueKind::Journal,
            topics: topics.iter().map(|s| (*s).to_string()).collect(),
            impact_factor,
            acceptance_rate,
            open_access,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn topic_match_dominates_with_default_weights() {
        let interests = vec![interest("retrieval", 0.9)];
        let venues = vec![
            venue("ven-1", "Retrieval Journal", &["retrieval"], None, None, false),
            venue("ven-2", "Generic Letters", &["chemistry"], Some(8.0), Some(0.1), true),
        ];

        let scores = match_venues(&interests, &venues, &VenueMatchWeights::default());

        assert_eq!(scores[0].venue_id, "ven-1");
        assert!((scores[0].breakdown.topic_overlap - 1.0).abs() < f64::EPSILON);
        assert!(scores[1].breakdown.topic_overlap.abs() < f64::EPSILON);
    }

    #[test]
    fn impact_normalized_against_candidate_set() {
        let venues = vec![
            venue("ven-1", "A", &[], Some(2.0), None, false),
            venue("ven-2", "B", &[], Some(8.0), None, false),
        ];

        let scores = match_venues(&[], &venues, &VenueMatchWeights::default());

        let a = scores.iter().find(|s| s.venue_id == "ven-1").unwrap();
        let b = scores.iter().find(|s| s.venue_id == "ven-2").unwrap();
        assert!((b.breakdown.impact - 1.0).abs() < f64::EPSILON);
        assert!((a.breakdown.impact - 0.25).abs() < f64::EPSILON);
        assert_eq!(scores[0].venue_id, "ven-2");
    }

    #[test]
    fn missing_metadata_scores_zero_components() {
        let venues = vec![venue("ven-1", "Bare", &[], None, None, false)];
        let scores = match_venues(&[], &venues, &VenueMatchWeights::default());

        assert!(scores[0].score.abs() < f64::EPSILON);
        assert!(scores[0].breakdown.impact.abs() < f64::EPSILON);
        assert!(scores[0].breakdown.acceptance.abs() < f64::EPSILON);
    }

    #[test]
    fn selective_venue_beats_permissive_on_acceptance() {
        let venues = vec![
            venue("ven-selective", "Selective", &[], None, Some(0.1), false),
            venue("ven-permissive", "Permissive", &[], None, Some(0.8), false),
        ];

        let scores = match_venues(&[], &venues, &VenueMatchWeights::default());

        assert_eq!(scores[0].venue_id, "ven-selective");
        assert!((scores[0].breakdown.acceptance - 0.9).abs() < 1e-9);
    }

    #[test]
    fn open_access_bonus_breaks_ties() {
        let venues = vec![
            venue("ven-closed", "Closed", &[], None, None, false),
            venue("ven-open", "Open", &[], None, None, true),
        ];

        let scores = match_venues(&[], &venues, &VenueMatchWeights::default());
        assert_eq!(scores[0].venue_id, "ven-open");
    }

    #[test]
    fn equal_scores_sort_by_name() {
        let venues = vec![
            venue("ven-2", "Zeta", &[], None, None, false),
            venue("ven-1", "Alpha", &[], None, None, false),
        ];

        let scores = match_venues(&[], &venues, &VenueMatchWeights::default());
        assert_eq!(scores[0].name, "Alpha");
    }
}
