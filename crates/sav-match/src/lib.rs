//! # sav-match
//!
//! Weighted linear scoring of publication venues and funding opportunities
//! against a researcher's interest profile.
//!
//! Both matchers are pure functions over already-loaded entities: they rank
//! a candidate set and return per-component score breakdowns so the CLI can
//! explain a ranking.

pub mod funding;
mod score;
pub mod venue;

pub use funding::{FundingMatchWeights, FundingScore, match_funding};
pub use venue::{VenueMatchWeights, VenueScore, match_venues};
