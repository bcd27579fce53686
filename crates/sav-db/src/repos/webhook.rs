//! Webhook endpoint repository.

use chrono::Utc;

use sav_core::entities::WebhookEndpoint;
use sav_core::enums::{AuditAction, EntityType};
use sav_core::ids::PREFIX_WEBHOOK;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::SavService;

fn row_to_webhook(row: &libsql::Row) -> Result<WebhookEndpoint, DatabaseError> {
    Ok(WebhookEndpoint {
        id: row.get::<String>(0)?,
        url: row.get::<String>(1)?,
        secret: get_opt_string(row, 2)?,
        active: row.get::<i64>(3)? != 0,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl SavService {
    /// Register a webhook endpoint (starts active).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn register_webhook(
        &self,
        url: &str,
        secret: Option<&str>,
    ) -> Result<WebhookEndpoint, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_WEBHOOK).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO webhook_endpoints (id, url, secret, active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                libsql::params![id.as_str(), url, secret, now.to_rfc3339()],
            )
            .await?;

        self.record_audit(EntityType::Webhook, &id, AuditAction::Created, None)
            .await?;

        Ok(WebhookEndpoint {
            id,
            url: url.to_string(),
            secret: secret.map(String::from),
            active: true,
            created_at: now,
        })
    }

    /// List webhook endpoints, optionally restricted to active ones.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_webhooks(
        &self,
        active_only: bool,
    ) -> Result<Vec<WebhookEndpoint>, DatabaseError> {
        let sql = if active_only {
            "SELECT id, url, secret, active, created_at FROM webhook_endpoints
             WHERE active = 1 ORDER BY created_at"
        } else {
            "SELECT id, url, secret, active, created_at FROM webhook_endpoints
             ORDER BY created_at"
        };
        let mut rows = self.db().conn().query(sql, ()).await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_webhook(&row)?);
        }
        Ok(items)
    }

    /// Deactivate a webhook endpoint.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn deactivate_webhook(&self, id: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE webhook_endpoints SET active = 0 WHERE id = ?1",
                [id],
            )
            .await?;

        self.record_audit(EntityType::Webhook, id, AuditAction::Updated, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn register_and_list() {
        let svc = test_service().await;

        let hook = svc
            .register_webhook("https://example.org/hook", Some("s3cret"))
            .await
            .unwrap();
        assert!(hook.id.starts_with("whk-"));
        assert!(hook.active);

        let hooks = svc.list_webhooks(true).await.unwrap();
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].url, "https://example.org/hook");
        assert_eq!(hooks[0].secret.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn deactivate_hides_from_active_list() {
        let svc = test_service().await;
        let hook = svc.register_webhook("https://a.example", None).await.unwrap();
        svc.register_webhook("https://b.example", None).await.unwrap();

        svc.deactivate_webhook(&hook.id).await.unwrap();

        let active = svc.list_webhooks(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].url, "https://b.example");

        let all = svc.list_webhooks(false).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
