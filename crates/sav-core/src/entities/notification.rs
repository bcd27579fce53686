use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{NotificationPriority, NotificationStatus};

/// A queued notification.
///
/// Delivery attempts are counted; after the retry policy's maximum the
/// notification is dead-lettered (status `dead`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub profile_id: Option<String>,
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub status: NotificationStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}
