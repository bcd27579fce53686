//! CLI response types returned as JSON by `sav` commands.
//!
//! These structs define the shape of JSON output for commands like
//! `sav ingest`, `sav search`, `sav venue match`, and `sav optimize`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Document;

/// Response from `sav ingest`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IngestResponse {
    pub document: Document,
    pub chunks_embedded: u32,
}

/// A single ranked hit from `sav search`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SearchHit {
    pub chunk_id: String,
    pub document_id: String,
    pub document_title: String,
    pub snippet: String,
    pub vector_score: Option<f64>,
    pub fts_score: Option<f64>,
    pub score: f64,
}

/// Response from `sav search`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SearchResponse {
    pub query: String,
    pub profile_id: Option<String>,
    pub hits: Vec<SearchHit>,
    pub total_hits: u32,
}

/// Response from `sav notify drain`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DrainResponse {
    pub delivered: u32,
    pub failed: u32,
    pub dead_lettered: u32,
}
