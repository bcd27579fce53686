//! Publication venue update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct VenueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_factor: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_access: Option<bool>,
}

pub struct VenueUpdateBuilder(VenueUpdate);

impl VenueUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(VenueUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn topics(mut self, topics: Vec<String>) -> Self {
        self.0.topics = Some(topics);
        self
    }

    #[must_use]
    pub fn impact_factor(mut self, impact_factor: Option<f64>) -> Self {
        self.0.impact_factor = Some(impact_factor);
        self
    }

    #[must_use]
    pub fn acceptance_rate(mut self, acceptance_rate: Option<f64>) -> Self {
        self.0.acceptance_rate = Some(acceptance_rate);
        self
    }

    #[must_use]
    pub const fn open_access(mut self, open_access: bool) -> Self {
        self.0.open_access = Some(open_access);
        self
    }

    #[must_use]
    pub fn build(self) -> VenueUpdate {
        self.0
    }
}

impl Default for VenueUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
