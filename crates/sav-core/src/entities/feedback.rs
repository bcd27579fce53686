use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FeedbackAction;

/// A recorded interaction with a retrieval result.
///
/// Feedback events feed both the interest-weight nudging loop and the
/// offline parameter-tuning replay.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub id: String,
    pub profile_id: String,
    pub query: String,
    pub chunk_id: String,
    pub action: FeedbackAction,
    pub created_at: DateTime<Utc>,
}
