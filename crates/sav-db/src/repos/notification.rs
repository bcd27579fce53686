//! Notification queue repository.
//!
//! The queue is drained in priority order (`priority_rank DESC`, then FIFO
//! within a rank). Status moves along the state machine in `sav-core`:
//! claiming sets `sending`, delivery outcomes set `delivered`/`failed`, and
//! a failure at the attempt limit dead-letters the notification.

use chrono::Utc;

use sav_core::entities::Notification;
use sav_core::enums::{AuditAction, EntityType, NotificationPriority, NotificationStatus};
use sav_core::ids::PREFIX_NOTIFICATION;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::SavService;

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get::<String>(0)?,
        profile_id: get_opt_string(row, 1)?,
        title: row.get::<String>(2)?,
        body: row.get::<String>(3)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        attempts: u32::try_from(row.get::<i64>(6)?).unwrap_or(0),
        last_error: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
        delivered_at: parse_optional_datetime(row.get::<Option<String>>(10)?.as_deref())?,
    })
}

const NOTIFICATION_SELECT: &str = "SELECT id, profile_id, title, body, priority, status, attempts, last_error,
            created_at, updated_at, delivered_at
     FROM notifications";

impl SavService {
    /// Enqueue a notification with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn enqueue_notification(
        &self,
        profile_id: Option<&str>,
        title: &str,
        body: &str,
        priority: NotificationPriority,
    ) -> Result<Notification, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_NOTIFICATION).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO notifications (id, profile_id, title, body, priority, priority_rank, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?7)",
                libsql::params![
                    id.as_str(),
                    profile_id,
                    title,
                    body,
                    priority.as_str(),
                    priority.rank(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.record_audit(EntityType::Notification, &id, AuditAction::Created, None)
            .await?;

        Ok(Notification {
            id,
            profile_id: profile_id.map(String::from),
            title: title.to_string(),
            body: body.to_string(),
            priority,
            status: NotificationStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        })
    }

    /// Get a notification by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if it does not exist.
    pub async fn get_notification(&self, id: &str) -> Result<Notification, DatabaseError> {
        let sql = format!("{NOTIFICATION_SELECT} WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_notification(&row)
    }

    /// List notifications, optionally filtered by status, queue order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_notifications(
        &self,
        status: Option<NotificationStatus>,
        limit: u32,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut items = Vec::new();
        match status {
            Some(s) => {
                let sql = format!(
                    "{NOTIFICATION_SELECT} WHERE status = ?1
                     ORDER BY priority_rank DESC, created_at LIMIT ?2"
                );
                let mut rows = self
                    .db()
                    .conn()
                    .query(&sql, libsql::params![s.as_str(), i64::from(limit)])
                    .await?;
                while let Some(row) = rows.next().await? {
                    items.push(row_to_notification(&row)?);
                }
            }
            None => {
                let sql = format!(
                    "{NOTIFICATION_SELECT} ORDER BY priority_rank DESC, created_at LIMIT ?1"
                );
                let mut rows = self.db().conn().query(&sql, [i64::from(limit)]).await?;
                while let Some(row) = rows.next().await? {
                    items.push(row_to_notification(&row)?);
                }
            }
        }
        Ok(items)
    }

    /// Claim up to `limit` deliverable notifications (`pending` or `failed`),
    /// highest priority first, FIFO within a priority. Claimed rows move to
    /// `sending` and are returned in claim order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn claim_ready(&self, limit: u32) -> Result<Vec<Notification>, DatabaseError> {
        let sql = format!(
            "{NOTIFICATION_SELECT} WHERE status IN ('pending', 'failed')
             ORDER BY priority_rank DESC, created_at LIMIT ?1"
        );
        let mut rows = self.db().conn().query(&sql, [i64::from(limit)]).await?;

        let mut claimed = Vec::new();
        let now = Utc::now();
        while let Some(row) = rows.next().await? {
            let mut notification = row_to_notification(&row)?;
            // pending → sending and failed → sending are both legal; anything
            // else here means the SELECT and the state machine disagree.
            if !notification
                .status
                .can_transition_to(NotificationStatus::Sending)
            {
                return Err(DatabaseError::InvalidState(format!(
                    "notification {} in status {} cannot be claimed",
                    notification.id, notification.status
                )));
            }
            notification.status = NotificationStatus::Sending;
            notification.updated_at = now;
            claimed.push(notification);
        }
        drop(rows);

        for notification in &claimed {
            self.db()
                .conn()
                .execute(
                    "UPDATE notifications SET status = 'sending', updated_at = ?1 WHERE id = ?2",
                    libsql::params![now.to_rfc3339(), notification.id.as_str()],
                )
                .await?;
        }

        Ok(claimed)
    }

    /// Mark a `sending` notification as delivered.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the notification is not in
    /// `sending`.
    pub async fn record_delivery(&self, id: &str) -> Result<Notification, DatabaseError> {
        let current = self.get_notification(id).await?;
        if !current
            .status
            .can_transition_to(NotificationStatus::Delivered)
        {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot deliver notification {} from status {}",
                id, current.status
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE notifications SET status = 'delivered', delivered_at = ?1, updated_at = ?1
                 WHERE id = ?2",
                libsql::params![now.to_rfc3339(), id],
            )
            .await?;

        self.record_audit(EntityType::Notification, id, AuditAction::Delivered, None)
            .await?;

        Ok(Notification {
            status: NotificationStatus::Delivered,
            delivered_at: Some(now),
            updated_at: now,
            ..current
        })
    }

    /// Record a failed delivery attempt.
    ///
    /// Increments the attempt counter; at `max_attempts` the notification is
    /// dead-lettered, otherwise it returns to `failed` for a later retry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the notification is not in
    /// `sending`.
    pub async fn record_failure(
        &self,
        id: &str,
        error: &str,
        max_attempts: u32,
    ) -> Result<Notification, DatabaseError> {
        let current = self.get_notification(id).await?;
        if current.status != NotificationStatus::Sending {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot fail notification {} from status {}",
                id, current.status
            )));
        }

        let attempts = current.attempts + 1;
        let next_status = if attempts >= max_attempts {
            NotificationStatus::Dead
        } else {
            NotificationStatus::Failed
        };

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE notifications SET status = ?1, attempts = ?2, last_error = ?3, updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    next_status.as_str(),
                    i64::from(attempts),
                    error,
                    now.to_rfc3339(),
                    id
                ],
            )
            .await?;

        self.record_audit(
            EntityType::Notification,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::json!({
                "to": next_status.to_string(),
                "attempts": attempts,
                "error": error,
            })),
        )
        .await?;

        Ok(Notification {
            status: next_status,
            attempts,
            last_error: Some(error.to_string()),
            updated_at: now,
            ..current
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn enqueue_and_get() {
        let svc = test_service().await;

        let n = svc
            .enqueue_notification(None, "Deadline near", "NSF call closes soon", NotificationPriority::High)
            .await
            .unwrap();

        assert!(n.id.starts_with("ntf-"));
        assert_eq!(n.status, NotificationStatus::Pending);
        assert_eq!(n.attempts, 0);

        let fetched = svc.get_notification(&n.id).await.unwrap();
        assert_eq!(fetched.priority, NotificationPriority::High);
        assert_eq!(fetched.status, NotificationStatus::Pending);
    }

    #[tokio::test]
    async fn claim_orders_by_priority_then_age() {
        let svc = test_service().await;

        let low = svc
            .enqueue_notification(None, "low", "b", NotificationPriority::Low)
            .await
            .unwrap();
        let urgent = svc
            .enqueue_notification(None, "urgent", "b", NotificationPriority::Urgent)
            .await
            .unwrap();
        let normal = svc
            .enqueue_notification(None, "normal", "b", NotificationPriority::Normal)
            .await
            .unwrap();

        let claimed = svc.claim_ready(10).await.unwrap();
        let ids: Vec<&str> = claimed.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![urgent.id.as_str(), normal.id.as_str(), low.id.as_str()]);
        assert!(
            claimed
                .iter()
                .all(|n| n.status == NotificationStatus::Sending)
        );
    }

    #[tokio::test]
    async fn claim_respects_limit_and_skips_done() {
        let svc = test_service().await;

        let first = svc
            .enqueue_notification(None, "one", "b", NotificationPriority::Normal)
            .await
            .unwrap();
        svc.enqueue_notification(None, "two", "b", NotificationPriority::Normal)
            .await
            .unwrap();

        let claimed = svc.claim_ready(1).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].id, first.id);
        svc.record_delivery(&first.id).await.unwrap();

        // Delivered notification is no longer claimable
        let claimed = svc.claim_ready(10).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].title, "two");
    }

    #[tokio::test]
    async fn delivery_sets_timestamp() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "t", "b", NotificationPriority::Normal)
            .await
            .unwrap();
        svc.claim_ready(1).await.unwrap();

        let delivered = svc.record_delivery(&n.id).await.unwrap();
        assert_eq!(delivered.status, NotificationStatus::Delivered);
        assert!(delivered.delivered_at.is_some());
    }

    #[tokio::test]
    async fn delivery_requires_sending() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "t", "b", NotificationPriority::Normal)
            .await
            .unwrap();

        // Still pending — cannot jump straight to delivered
        let result = svc.record_delivery(&n.id).await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn failure_counts_attempts_and_allows_retry() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "t", "b", NotificationPriority::Normal)
            .await
            .unwrap();

        svc.claim_ready(1).await.unwrap();
        let failed = svc.record_failure(&n.id, "connection refused", 3).await.unwrap();
        assert_eq!(failed.status, NotificationStatus::Failed);
        assert_eq!(failed.attempts, 1);
        assert_eq!(failed.last_error.as_deref(), Some("connection refused"));

        // Failed notifications are claimable again
        let reclaimed = svc.claim_ready(10).await.unwrap();
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].id, n.id);
    }

    #[tokio::test]
    async fn failure_dead_letters_at_max_attempts() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "t", "b", NotificationPriority::Normal)
            .await
            .unwrap();

        for attempt in 1..=3 {
            svc.claim_ready(1).await.unwrap();
            let failed = svc.record_failure(&n.id, "boom", 3).await.unwrap();
            assert_eq!(failed.attempts, attempt);
        }

        let final_state = svc.get_notification(&n.id).await.unwrap();
        assert_eq!(final_state.status, NotificationStatus::Dead);

        // Dead notifications are not claimable
        assert!(svc.claim_ready(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "a", "b", NotificationPriority::Normal)
            .await
            .unwrap();
        svc.enqueue_notification(None, "c", "d", NotificationPriority::Normal)
            .await
            .unwrap();

        svc.claim_ready(1).await.unwrap();
        svc.record_delivery(&n.id).await.unwrap();

        let pending = svc
            .list_notifications(Some(NotificationStatus::Pending), 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let delivered = svc
            .list_notifications(Some(NotificationStatus::Delivered), 10)
            .await
            .unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].id, n.id);

        let all = svc.list_notifications(None, 10).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
