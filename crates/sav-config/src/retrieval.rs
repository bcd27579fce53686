//! Retrieval parameter defaults.
//!
//! These seed `RetrievalParams` in `sav-retrieval`; the optimizer and
//! per-command flags can override them at call time.

use serde::{Deserialize, Serialize};

const fn default_alpha() -> f64 {
    0.7
}

const fn default_gamma() -> f64 {
    0.3
}

const fn default_min_score() -> f64 {
    0.0
}

const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Vector/FTS blend weight: `0.0` = keyword only, `1.0` = vector only.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Personalization strength: `0.0` disables interest boosting.
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Minimum combined score — hits below are excluded.
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Maximum number of hits to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            gamma: default_gamma(),
            min_score: default_min_score(),
            limit: default_limit(),
        }
    }
}
