use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FundingStatus;

/// A funding opportunity (grant call, fellowship, ...).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FundingOpportunity {
    pub id: String,
    pub title: String,
    pub agency: String,
    pub topics: Vec<String>,
    /// Award amount in whole currency units, if published.
    pub amount: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: FundingStatus,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}
