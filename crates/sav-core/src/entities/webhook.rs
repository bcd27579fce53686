use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A registered webhook endpoint for notification delivery.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WebhookEndpoint {
    pub id: String,
    pub url: String,
    /// Shared secret sent as `X-Savant-Token` on delivery.
    pub secret: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
