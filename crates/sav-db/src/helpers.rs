//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic: the dual datetime format
//! issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`), serde-based
//! enum parsing, JSON list columns, and the f32 embedding blob codec.

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all sav-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Parse a TEXT column holding a JSON string array (e.g., venue topics).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not a valid JSON array of strings.
pub fn parse_string_list(s: &str) -> Result<Vec<String>, DatabaseError> {
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid JSON list in column: {e}")))
}

/// Serialize a string list for storage in a TEXT column.
#[must_use]
pub fn string_list_to_json(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

/// Encode an embedding vector as an f32 little-endian BLOB.
#[must_use]
pub fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for x in embedding {
        blob.extend_from_slice(&x.to_le_bytes());
    }
    blob
}

/// Decode an f32 little-endian BLOB back into an embedding vector.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the blob length is not a multiple of 4.
pub fn blob_to_embedding(blob: &[u8]) -> Result<Vec<f32>, DatabaseError> {
    if blob.len() % 4 != 0 {
        return Err(DatabaseError::Query(format!(
            "Embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_rfc3339() {
        let dt = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-02-09T14:30:00+00:00");
    }

    #[test]
    fn datetime_sqlite_default() {
        let dt = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-02-09T14:30:00+00:00");
    }

    #[test]
    fn datetime_garbage_rejected() {
        assert!(parse_datetime("not a date").is_err());
    }

    #[test]
    fn string_list_roundtrip() {
        let topics = vec!["nlp".to_string(), "information retrieval".to_string()];
        let json = string_list_to_json(&topics);
        assert_eq!(parse_string_list(&json).unwrap(), topics);
    }

    #[test]
    fn empty_string_list() {
        assert!(parse_string_list("[]").unwrap().is_empty());
    }

    #[test]
    fn embedding_blob_roundtrip() {
        let embedding = vec![0.0_f32, 1.5, -2.25, f32::MIN_POSITIVE];
        let blob = embedding_to_blob(&embedding);
        assert_eq!(blob.len(), 16);
        assert_eq!(blob_to_embedding(&blob).unwrap(), embedding);
    }

    #[test]
    fn embedding_blob_bad_length() {
        assert!(blob_to_embedding(&[0u8, 1, 2]).is_err());
    }

    #[test]
    fn enum_parse() {
        use sav_core::enums::NotificationStatus;
        let status: NotificationStatus = parse_enum("pending").unwrap();
        assert_eq!(status, NotificationStatus::Pending);
        assert!(parse_enum::<NotificationStatus>("bogus").is_err());
    }
}
