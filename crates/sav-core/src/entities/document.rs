use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ingested document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub profile_id: Option<String>,
    pub title: String,
    /// Original location (file path or URL), if known.
    pub source: Option<String>,
    pub chunk_count: u32,
    pub ingested_at: DateTime<Utc>,
}

/// A chunk of document text with its embedding.
///
/// The embedding is stored as an f32 little-endian BLOB in the database and
/// skipped in JSON output (it is an implementation detail of retrieval).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DocChunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: u32,
    pub content: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}
