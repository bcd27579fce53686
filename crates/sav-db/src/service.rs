//! Service layer orchestrating database mutations with audit entries.
//!
//! `SavService` wraps `SavDb` (raw database access). All repo methods are
//! implemented as `impl SavService` blocks in `repos/`, and every mutation
//! appends an audit entry via [`SavService::record_audit`].

use chrono::Utc;

use sav_core::enums::{AuditAction, EntityType};
use sav_core::ids::PREFIX_AUDIT;

use crate::SavDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with audit-trail bookkeeping.
pub struct SavService {
    db: SavDb,
}

impl SavService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = SavDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `SavDb`.
    #[must_use]
    pub const fn from_db(db: SavDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &SavDb {
        &self.db
    }

    /// Append an audit entry for a mutation. Called by every repo method
    /// that changes state.
    pub(crate) async fn record_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<(), DatabaseError> {
        let id = self.db.generate_id(PREFIX_AUDIT).await?;
        let detail_text = detail
            .map(|v| serde_json::to_string(&v).map_err(|e| DatabaseError::Other(e.into())))
            .transpose()?;
        self.db
            .conn()
            .execute(
                "INSERT INTO audit_trail (id, entity_type, entity_id, action, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    entity_type.as_str(),
                    entity_id,
                    action.as_str(),
                    detail_text,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }
}
