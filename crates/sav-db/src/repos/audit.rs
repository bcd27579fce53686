//! Audit trail repository — filtered queries over appended entries.
//!
//! Entries are appended by [`SavService::record_audit`] inside every
//! mutating repo method; this module only reads.

use sav_core::entities::AuditEntry;
use sav_core::enums::{AuditAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum, parse_optional_json};
use crate::service::SavService;

/// Filter for audit trail queries. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        entity_type: parse_enum(&row.get::<String>(1)?)?,
        entity_id: row.get::<String>(2)?,
        action: parse_enum(&row.get::<String>(3)?)?,
        detail: parse_optional_json(row.get::<Option<String>>(4)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl SavService {
    /// Record a parameter-tuning run against a profile.
    ///
    /// The detail payload is the tuning report (strategy, best parameters,
    /// score, evaluation count).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn record_tuning(
        &self,
        profile_id: &str,
        report: serde_json::Value,
    ) -> Result<(), DatabaseError> {
        self.record_audit(
            EntityType::Profile,
            profile_id,
            AuditAction::Tuned,
            Some(report),
        )
        .await
    }

    /// Query the audit trail, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut where_clauses = vec!["1=1".to_string()];
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(entity_type) = filter.entity_type {
            params.push(libsql::Value::Text(entity_type.as_str().to_string()));
            where_clauses.push(format!("entity_type = ?{idx}"));
            idx += 1;
        }
        if let Some(ref entity_id) = filter.entity_id {
            params.push(libsql::Value::Text(entity_id.clone()));
            where_clauses.push(format!("entity_id = ?{idx}"));
            idx += 1;
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            where_clauses.push(format!("action = ?{idx}"));
            idx += 1;
        }

        let limit = filter.limit.unwrap_or(50);
        params.push(libsql::Value::Integer(i64::from(limit)));

        let sql = format!(
            "SELECT id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail WHERE {} ORDER BY created_at DESC LIMIT ?{idx}",
            where_clauses.join(" AND ")
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn mutations_append_audit_entries() {
        let svc = test_service().await;
        let profile = svc.create_profile("Audited", None).await.unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Profile),
                entity_id: Some(profile.id.clone()),
                action: Some(AuditAction::Created),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, profile.id);
        assert_eq!(entries[0].action, AuditAction::Created);
    }

    #[tokio::test]
    async fn filter_by_action() {
        let svc = test_service().await;
        let profile = svc.create_profile("Busy", None).await.unwrap();
        svc.set_interest(&profile.id, "nlp", 0.5).await.unwrap();
        svc.delete_profile(&profile.id).await.unwrap();

        let updated = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Updated),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(
            updated[0].detail.as_ref().unwrap()["interest"],
            serde_json::json!("nlp")
        );

        let deleted = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Deleted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
    }

    #[tokio::test]
    async fn record_tuning_appends_tuned_entry() {
        let svc = test_service().await;
        let profile = svc.create_profile("Tuner", None).await.unwrap();

        svc.record_tuning(
            &profile.id,
            serde_json::json!({ "best_score": 0.83, "evaluations": 25 }),
        )
        .await
        .unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Tuned),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, profile.id);
        assert_eq!(
            entries[0].detail.as_ref().unwrap()["evaluations"],
            serde_json::json!(25)
        );
    }

    #[tokio::test]
    async fn limit_applies() {
        let svc = test_service().await;
        for i in 0..5 {
            svc.create_profile(&format!("P{i}"), None).await.unwrap();
        }

        let entries = svc
            .query_audit(&AuditFilter {
                limit: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
    }
}
