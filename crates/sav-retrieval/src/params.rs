//! Retrieval parameters — the knobs the optimizer tunes.

use serde::{Deserialize, Serialize};

/// Parameters controlling a retrieval pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Vector/FTS blend weight: `0.0` = keyword only, `1.0` = vector only.
    pub alpha: f64,
    /// Personalization strength: `0.0` disables interest boosting.
    pub gamma: f64,
    /// Maximum number of hits to return.
    pub limit: u32,
    /// Minimum combined score — hits below are excluded before
    /// personalization.
    pub min_score: f64,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            gamma: 0.3,
            limit: 20,
            min_score: 0.0,
        }
    }
}

impl RetrievalParams {
    /// Return a copy with all fields forced into their valid ranges.
    ///
    /// `alpha`, `gamma`, and `min_score` are clamped to `[0, 1]`; `limit`
    /// is raised to at least 1.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            alpha: self.alpha.clamp(0.0, 1.0),
            gamma: self.gamma.clamp(0.0, 1.0),
            limit: self.limit.max(1),
            min_score: self.min_score.clamp(0.0, 1.0),
        }
    }
}
