//! Feedback event repository.
//!
//! Feedback is append-only. Besides plain listing, the repo can group
//! positive-reward events into query replay pairs, which the retrieval
//! optimizer uses as ground truth when scoring parameter candidates.

use chrono::Utc;

use sav_core::entities::FeedbackEvent;
use sav_core::enums::{AuditAction, EntityType, FeedbackAction};
use sav_core::ids::PREFIX_FEEDBACK;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};
use crate::service::SavService;

/// A query with the chunks a researcher judged relevant (positive feedback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPair {
    pub query: String,
    pub relevant_chunk_ids: Vec<String>,
}

fn row_to_feedback(row: &libsql::Row) -> Result<FeedbackEvent, DatabaseError> {
    Ok(FeedbackEvent {
        id: row.get::<String>(0)?,
        profile_id: row.get::<String>(1)?,
        query: row.get::<String>(2)?,
        chunk_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl SavService {
    /// Record a feedback event.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn record_feedback(
        &self,
        profile_id: &str,
        query: &str,
        chunk_id: &str,
        action: FeedbackAction,
    ) -> Result<FeedbackEvent, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_FEEDBACK).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO feedback_events (id, profile_id, query, chunk_id, action, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    profile_id,
                    query,
                    chunk_id,
                    action.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.record_audit(
            EntityType::Feedback,
            &id,
            AuditAction::FeedbackRecorded,
            Some(serde_json::json!({ "action": action.to_string(), "chunk": chunk_id })),
        )
        .await?;

        Ok(FeedbackEvent {
            id,
            profile_id: profile_id.to_string(),
            query: query.to_string(),
            chunk_id: chunk_id.to_string(),
            action,
            created_at: now,
        })
    }

    /// List feedback events for a profile, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_feedback(
        &self,
        profile_id: &str,
        limit: u32,
    ) -> Result<Vec<FeedbackEvent>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, profile_id, query, chunk_id, action, created_at
                 FROM feedback_events WHERE profile_id = ?1
                 ORDER BY created_at DESC LIMIT ?2",
                libsql::params![profile_id, i64::from(limit)],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_feedback(&row)?);
        }
        Ok(items)
    }

    /// Group a profile's positive feedback into query replay pairs.
    ///
    /// Only actions with a positive reward count as relevance judgments;
    /// dismissals are ignored. Queries appear in first-seen order, each with
    /// its distinct relevant chunk IDs.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn replay_pairs(&self, profile_id: &str) -> Result<Vec<ReplayPair>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT query, chunk_id, action FROM feedback_events
                 WHERE profile_id = ?1 ORDER BY created_at",
                [profile_id],
            )
            .await?;

        let mut pairs: Vec<ReplayPair> = Vec::new();
        while let Some(row) = rows.next().await? {
            let query = row.get::<String>(0)?;
            let chunk_id = row.get::<String>(1)?;
            let action: FeedbackAction = parse_enum(&row.get::<String>(2)?)?;
            if action.reward() <= 0.0 {
                continue;
            }

            match pairs.iter_mut().find(|p| p.query == query) {
                Some(pair) => {
                    if !pair.relevant_chunk_ids.contains(&chunk_id) {
                        pair.relevant_chunk_ids.push(chunk_id);
                    }
                }
                None => pairs.push(ReplayPair {
                    query,
                    relevant_chunk_ids: vec![chunk_id],
                }),
            }
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_profile, test_service};

    #[tokio::test]
    async fn record_and_list() {
        let svc = test_service().await;
        let pid = test_profile(&svc).await;

        let event = svc
            .record_feedback(&pid, "dense retrieval", "chk-1", FeedbackAction::Saved)
            .await
            .unwrap();
        assert!(event.id.starts_with("fbk-"));

        let events = svc.list_feedback(&pid, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query, "dense retrieval");
        assert_eq!(events[0].action, FeedbackAction::Saved);
    }

    #[tokio::test]
    async fn replay_pairs_group_by_query() {
        let svc = test_service().await;
        let pid = test_profile(&svc).await;

        svc.record_feedback(&pid, "q1", "chk-a", FeedbackAction::Clicked)
            .await
            .unwrap();
        svc.record_feedback(&pid, "q1", "chk-b", FeedbackAction::Cited)
            .await
            .unwrap();
        svc.record_feedback(&pid, "q2", "chk-c", FeedbackAction::Saved)
            .await
            .unwrap();
        // Duplicate judgment, should not repeat
        svc.record_feedback(&pid, "q1", "chk-a", FeedbackAction::Saved)
            .await
            .unwrap();

        let pairs = svc.replay_pairs(&pid).await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].query, "q1");
        assert_eq!(pairs[0].relevant_chunk_ids, vec!["chk-a", "chk-b"]);
        assert_eq!(pairs[1].query, "q2");
    }

    #[tokio::test]
    async fn replay_pairs_ignore_dismissals() {
        let svc = test_service().await;
        let pid = test_profile(&svc).await;

        svc.record_feedback(&pid, "q", "chk-bad", FeedbackAction::Dismissed)
            .await
            .unwrap();

        let pairs = svc.replay_pairs(&pid).await.unwrap();
        assert!(pairs.is_empty(), "dismissals are not relevance judgments");
    }
}
