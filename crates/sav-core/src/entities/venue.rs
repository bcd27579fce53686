use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::VenueKind;

/// A publication venue (journal, conference, or workshop).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PublicationVenue {
    pub id: String,
    pub name: String,
    pub kind: VenueKind,
    /// Topic keywords the venue publishes on.
    pub topics: Vec<String>,
    pub impact_factor: Option<f64>,
    /// Fraction of submissions accepted, in `[0, 1]`.
    pub acceptance_rate: Option<f64>,
    pub open_access: bool,
    pub created_at: DateTime<Utc>,
}
