//! Document repository — ingestion, chunk storage, and chunk retrieval.
//!
//! Chunks carry their embedding as an f32 little-endian BLOB. The retrieval
//! layer loads candidates via [`SavService::chunk_records`] and does the
//! cosine scan in-process; keyword search goes through the FTS5 virtual
//! table populated by triggers.

use chrono::Utc;

use sav_core::entities::{DocChunk, Document};
use sav_core::enums::{AuditAction, EntityType};
use sav_core::ids::{PREFIX_CHUNK, PREFIX_DOCUMENT};

use crate::error::DatabaseError;
use crate::helpers::{blob_to_embedding, embedding_to_blob, get_opt_string, parse_datetime};
use crate::service::SavService;

/// A chunk joined with its document title, as retrieval consumes it.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub chunk: DocChunk,
    pub document_title: String,
}

fn row_to_document(row: &libsql::Row) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: row.get::<String>(0)?,
        profile_id: get_opt_string(row, 1)?,
        title: row.get::<String>(2)?,
        source: get_opt_string(row, 3)?,
        chunk_count: u32::try_from(row.get::<i64>(4)?).unwrap_or(0),
        ingested_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_chunk_record(row: &libsql::Row) -> Result<ChunkRecord, DatabaseError> {
    let embedding = match row.get::<Option<Vec<u8>>>(4)? {
        Some(blob) => blob_to_embedding(&blob)?,
        None => Vec::new(),
    };
    Ok(ChunkRecord {
        chunk: DocChunk {
            id: row.get::<String>(0)?,
            document_id: row.get::<String>(1)?,
            chunk_index: u32::try_from(row.get::<i64>(2)?).unwrap_or(0),
            content: row.get::<String>(3)?,
            embedding,
        },
        document_title: row.get::<String>(5)?,
    })
}

const CHUNK_SELECT: &str = "SELECT c.id, c.document_id, c.chunk_index, c.content, c.embedding, d.title
     FROM doc_chunks c JOIN documents d ON d.id = c.document_id";

impl SavService {
    /// Ingest a document: insert the document row and its chunks (content +
    /// embedding) in one pass.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any INSERT fails.
    pub async fn ingest_document(
        &self,
        profile_id: Option<&str>,
        title: &str,
        source: Option<&str>,
        chunks: &[(String, Vec<f32>)],
    ) -> Result<Document, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_DOCUMENT).await?;
        let chunk_count = u32::try_from(chunks.len()).unwrap_or(u32::MAX);

        self.db()
            .conn()
            .execute(
                "INSERT INTO documents (id, profile_id, title, source, chunk_count, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    profile_id,
                    title,
                    source,
                    i64::from(chunk_count),
                    now.to_rfc3339()
                ],
            )
            .await?;

        for (index, (content, embedding)) in chunks.iter().enumerate() {
            let chunk_id = self.db().generate_id(PREFIX_CHUNK).await?;
            let blob = if embedding.is_empty() {
                None
            } else {
                Some(embedding_to_blob(embedding))
            };
            self.db()
                .conn()
                .execute(
                    "INSERT INTO doc_chunks (id, document_id, chunk_index, content, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        chunk_id.as_str(),
                        id.as_str(),
                        i64::try_from(index).unwrap_or(i64::MAX),
                        content.as_str(),
                        blob
                    ],
                )
                .await?;
        }

        self.record_audit(
            EntityType::Document,
            &id,
            AuditAction::Ingested,
            Some(serde_json::json!({ "chunks": chunk_count })),
        )
        .await?;

        Ok(Document {
            id,
            profile_id: profile_id.map(String::from),
            title: title.to_string(),
            source: source.map(String::from),
            chunk_count,
            ingested_at: now,
        })
    }

    /// Get a document by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the document does not exist.
    pub async fn get_document(&self, id: &str) -> Result<Document, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, profile_id, title, source, chunk_count, ingested_at
                 FROM documents WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_document(&row)
    }

    /// List documents ordered by ingestion date descending.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_documents(&self, limit: u32) -> Result<Vec<Document>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, profile_id, title, source, chunk_count, ingested_at
                 FROM documents ORDER BY ingested_at DESC LIMIT ?1",
                [i64::from(limit)],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_document(&row)?);
        }
        Ok(items)
    }

    /// Delete a document. Chunks cascade via foreign keys (and FTS triggers).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_document(&self, id: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute("DELETE FROM documents WHERE id = ?1", [id])
            .await?;

        self.record_audit(EntityType::Document, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }

    /// Load chunk candidates for the in-process cosine scan.
    ///
    /// With `profile_id`, restricts to that profile's documents; otherwise
    /// scans the whole corpus. Chunks without an embedding are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn chunk_records(
        &self,
        profile_id: Option<&str>,
    ) -> Result<Vec<ChunkRecord>, DatabaseError> {
        let mut records = Vec::new();
        match profile_id {
            Some(pid) => {
                let sql =
                    format!("{CHUNK_SELECT} WHERE c.embedding IS NOT NULL AND d.profile_id = ?1");
                let mut rows = self.db().conn().query(&sql, [pid]).await?;
                while let Some(row) = rows.next().await? {
                    records.push(row_to_chunk_record(&row)?);
                }
            }
            None => {
                let sql = format!("{CHUNK_SELECT} WHERE c.embedding IS NOT NULL");
                let mut rows = self.db().conn().query(&sql, ()).await?;
                while let Some(row) = rows.next().await? {
                    records.push(row_to_chunk_record(&row)?);
                }
            }
        }
        Ok(records)
    }

    /// FTS5 keyword search over chunk content, ordered by FTS5 rank.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn search_chunks_fts(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ChunkRecord>, DatabaseError> {
        let sql = format!(
            "{CHUNK_SELECT} JOIN doc_chunks_fts fts ON fts.rowid = c.rowid
             WHERE doc_chunks_fts MATCH ?1 ORDER BY rank LIMIT ?2"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![query, i64::from(limit)])
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_chunk_record(&row)?);
        }
        Ok(records)
    }

    /// Get a single chunk (joined with its document title).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the chunk does not exist.
    pub async fn get_chunk(&self, chunk_id: &str) -> Result<ChunkRecord, DatabaseError> {
        let sql = format!("{CHUNK_SELECT} WHERE c.id = ?1");
        let mut rows = self.db().conn().query(&sql, [chunk_id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_chunk_record(&row)
    }
}
