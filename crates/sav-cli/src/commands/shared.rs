//! Helpers shared across command handlers.

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Parse a CLI string into a snake_case serde enum (e.g. "open" ->
/// `FundingStatus::Open`).
pub fn parse_enum_arg<T: DeserializeOwned>(value: &str, what: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .with_context(|| format!("invalid {what}: '{value}'"))
}

/// Split a comma-separated topics flag into trimmed, non-empty keywords.
#[must_use]
pub fn parse_topics(topics: Option<&str>) -> Vec<String> {
    topics
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sav_core::enums::{FeedbackAction, FundingStatus, NotificationPriority};

    #[test]
    fn parses_known_enums() {
        let status: FundingStatus = parse_enum_arg("closing", "status").unwrap();
        assert_eq!(status, FundingStatus::Closing);

        let priority: NotificationPriority = parse_enum_arg("URGENT", "priority").unwrap();
        assert_eq!(priority, NotificationPriority::Urgent);

        let action: FeedbackAction = parse_enum_arg("saved", "action").unwrap();
        assert_eq!(action, FeedbackAction::Saved);
    }

    #[test]
    fn rejects_unknown_values() {
        let result: anyhow::Result<FundingStatus> = parse_enum_arg("bogus", "status");
        assert!(result.is_err());
    }

    #[test]
    fn topics_split_and_normalize() {
        assert_eq!(
            parse_topics(Some("NLP, Information Retrieval ,,")),
            vec!["nlp".to_string(), "information retrieval".to_string()]
        );
        assert!(parse_topics(None).is_empty());
    }
}
