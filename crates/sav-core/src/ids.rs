//! ID prefix constants.
//!
//! Every entity ID has the form `<prefix>-<8 hex chars>`, e.g. `prf-a3f8b2c1`.
//! The random part is generated in SQL via `randomblob(4)` (see `sav-db`).

pub const PREFIX_PROFILE: &str = "prf";
pub const PREFIX_DOCUMENT: &str = "doc";
pub const PREFIX_CHUNK: &str = "chk";
pub const PREFIX_VENUE: &str = "ven";
pub const PREFIX_FUNDING: &str = "fun";
pub const PREFIX_NOTIFICATION: &str = "ntf";
pub const PREFIX_WEBHOOK: &str = "whk";
pub const PREFIX_FEEDBACK: &str = "fbk";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive ID-format tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_PROFILE,
    PREFIX_DOCUMENT,
    PREFIX_CHUNK,
    PREFIX_VENUE,
    PREFIX_FUNDING,
    PREFIX_NOTIFICATION,
    PREFIX_WEBHOOK,
    PREFIX_FEEDBACK,
    PREFIX_AUDIT,
];
