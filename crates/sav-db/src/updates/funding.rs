//! Funding opportunity update builder.
//!
//! Status changes go through `transition_funding`, not this builder, so the
//! state machine stays enforced.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FundingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
}

pub struct FundingUpdateBuilder(FundingUpdate);

impl FundingUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(FundingUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn agency(mut self, agency: impl Into<String>) -> Self {
        self.0.agency = Some(agency.into());
        self
    }

    #[must_use]
    pub fn topics(mut self, topics: Vec<String>) -> Self {
        self.0.topics = Some(topics);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Option<f64>) -> Self {
        self.0.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.0.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn url(mut self, url: Option<String>) -> Self {
        self.0.url = Some(url);
        self
    }

    #[must_use]
    pub fn build(self) -> FundingUpdate {
        self.0
    }
}

impl Default for FundingUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
