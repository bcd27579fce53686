//! # sav-db
//!
//! libSQL database operations for Savant state management.
//!
//! Handles all relational state: research profiles and their interest
//! weights, ingested documents and chunks (with embedding blobs),
//! publication venues, funding opportunities, the notification queue,
//! webhook endpoints, feedback events, and the audit trail.
//!
//! Uses the `libsql` crate (C `SQLite` fork) — provides native FTS5 and a
//! stable async API.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod test_support;
pub mod updates;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all Savant state operations.
///
/// Wraps a libSQL database and connection. Provides ID generation;
/// repository methods live on [`service::SavService`].
pub struct SavDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl SavDb {
    /// Open a local-only database at the given path.
    ///
    /// Runs migrations automatically on first open. Pass `":memory:"` for
    /// tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let sav_db = Self { db, conn };
        sav_db.run_migrations().await?;
        Ok(sav_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"prf-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Helper to create an in-memory database for testing.
    async fn test_db() -> SavDb {
        SavDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "profiles",
            "profile_interests",
            "documents",
            "doc_chunks",
            "venues",
            "funding_opportunities",
            "notifications",
            "webhook_endpoints",
            "feedback_events",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn fts5_table_exists() {
        let db = test_db().await;

        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='doc_chunks_fts'",
                (),
            )
            .await
            .unwrap();
        assert!(
            rows.next().await.unwrap().is_some(),
            "FTS5 table 'doc_chunks_fts' should exist"
        );
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("prf").await.unwrap();
        assert!(id.starts_with("prf-"), "ID should start with 'prf-': {id}");
        assert_eq!(
            id.len(),
            12,
            "ID should be 12 chars (3 prefix + 1 dash + 8 hex): {id}"
        );

        let hex_part = &id[4..];
        assert!(
            hex_part.chars().all(|c| c.is_ascii_hexdigit()),
            "Random part should be hex: {hex_part}"
        );
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in sav_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Run migrations again — should not fail
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn fts5_trigger_populates_on_insert() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO documents (id, title) VALUES ('doc-test1', 'Transformer survey')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO doc_chunks (id, document_id, chunk_index, content)
                 VALUES ('chk-test1', 'doc-test1', 0, 'attention mechanisms in transformers')",
                (),
            )
            .await
            .unwrap();

        // Porter stemming: "transformer" matches "transformers"
        let mut rows = db
            .conn()
            .query(
                "SELECT rowid FROM doc_chunks_fts WHERE doc_chunks_fts MATCH 'transformer'",
                (),
            )
            .await
            .unwrap();
        assert!(
            rows.next().await.unwrap().is_some(),
            "FTS trigger should populate on INSERT"
        );
    }

    #[tokio::test]
    async fn chunk_unique_constraint() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO documents (id, title) VALUES ('doc-u1', 'Doc')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO doc_chunks (id, document_id, chunk_index, content)
                 VALUES ('chk-u1', 'doc-u1', 0, 'first')",
                (),
            )
            .await
            .unwrap();

        // Duplicate (document_id, chunk_index) should fail
        let result = db
            .conn()
            .execute(
                "INSERT INTO doc_chunks (id, document_id, chunk_index, content)
                 VALUES ('chk-u2', 'doc-u1', 0, 'second')",
                (),
            )
            .await;
        assert!(result.is_err(), "Duplicate chunk index should be rejected");
    }
}
