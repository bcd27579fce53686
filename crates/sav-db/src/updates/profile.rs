//! Research profile update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(None)` clears the affiliation; `None` leaves it unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<Option<String>>,
}

pub struct ProfileUpdateBuilder(ProfileUpdate);

impl ProfileUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProfileUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn affiliation(mut self, affiliation: Option<String>) -> Self {
        self.0.affiliation = Some(affiliation);
        self
    }

    #[must_use]
    pub fn build(self) -> ProfileUpdate {
        self.0
    }
}

impl Default for ProfileUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
