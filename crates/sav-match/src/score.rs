//! Shared scoring helpers.

use sav_core::entities::Interest;

/// Weight-normalized overlap between interest keywords and topic strings,
/// in `[0, 1]`.
///
/// An interest matches a topic when either string contains the other
/// (case-insensitive), so "machine learning" matches the interest "learning"
/// and vice versa.
pub(crate) fn weighted_topic_overlap(interests: &[Interest], topics: &[String]) -> f64 {
    let total: f64 = interests.iter().map(|i| i.weight).sum();
    if total <= 0.0 || topics.is_empty() {
        return 0.0;
    }

    let topics: Vec<String> = topics.iter().map(|t| t.to_lowercase()).collect();
    let matched: f64 = interests
        .iter()
        .filter(|i| {
            topics
                .iter()
                .any(|t| t.contains(&i.keyword) || i.keyword.contains(t))
        })
        .map(|i| i.weight)
        .sum();

    matched / total
}

/// Sort scores descending, breaking ties by the given label for stable output.
pub(crate) fn sort_ranked<T>(items: &mut [T], score: impl Fn(&T) -> f64, label: impl Fn(&T) -> String) {
    items.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| label(a).cmp(&label(b)))
    });
}
