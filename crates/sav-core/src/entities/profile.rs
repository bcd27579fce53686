use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A researcher's profile — the anchor for personalization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchProfile {
    pub id: String,
    pub name: String,
    pub affiliation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A weighted interest keyword attached to a profile.
///
/// Weights live in `[0, 1]` and are nudged by retrieval feedback.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Interest {
    pub profile_id: String,
    pub keyword: String,
    pub weight: f64,
    pub updated_at: DateTime<Utc>,
}
