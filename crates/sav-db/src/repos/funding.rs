//! Funding opportunity repository — CRUD + status transitions + deadline scan.

use chrono::{Duration, Utc};

use sav_core::entities::FundingOpportunity;
use sav_core::enums::{AuditAction, EntityType, FundingStatus};
use sav_core::ids::PREFIX_FUNDING;

use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, parse_string_list,
    string_list_to_json,
};
use crate::service::SavService;
use crate::updates::FundingUpdate;

fn row_to_funding(row: &libsql::Row) -> Result<FundingOpportunity, DatabaseError> {
    Ok(FundingOpportunity {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        agency: row.get::<String>(2)?,
        topics: parse_string_list(&row.get::<String>(3)?)?,
        amount: row.get::<Option<f64>>(4)?,
        deadline: parse_optional_datetime(row.get::<Option<String>>(5)?.as_deref())?,
        status: parse_enum(&row.get::<String>(6)?)?,
        url: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

const FUNDING_SELECT: &str = "SELECT id, title, agency, topics, amount, deadline, status, url, created_at
     FROM funding_opportunities";

impl SavService {
    /// Create a funding opportunity (status starts at `open`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_funding(
        &self,
        title: &str,
        agency: &str,
        topics: &[String],
        amount: Option<f64>,
        deadline: Option<chrono::DateTime<Utc>>,
        url: Option<&str>,
    ) -> Result<FundingOpportunity, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_FUNDING).await?;
        let topics_json = string_list_to_json(topics);

        self.db()
            .conn()
            .execute(
                "INSERT INTO funding_opportunities (id, title, agency, topics, amount, deadline, status, url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'open', ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    title,
                    agency,
                    topics_json.as_str(),
                    amount,
                    deadline.map(|d| d.to_rfc3339()),
                    url,
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.record_audit(EntityType::Funding, &id, AuditAction::Created, None)
            .await?;

        Ok(FundingOpportunity {
            id,
            title: title.to_string(),
            agency: agency.to_string(),
            topics: topics.to_vec(),
            amount,
            deadline,
            status: FundingStatus::Open,
            url: url.map(String::from),
            created_at: now,
        })
    }

    /// Get a funding opportunity by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if it does not exist.
    pub async fn get_funding(&self, id: &str) -> Result<FundingOpportunity, DatabaseError> {
        let sql = format!("{FUNDING_SELECT} WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_funding(&row)
    }

    /// Update a funding opportunity with dynamic SET clauses.
    ///
    /// Status is excluded — use [`Self::transition_funding`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails or the entity is not found.
    pub async fn update_funding(
        &self,
        funding_id: &str,
        update: FundingUpdate,
    ) -> Result<FundingOpportunity, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref title) = update.title {
            params.push(libsql::Value::Text(title.clone()));
            sets.push(format!("title = ?{idx}"));
            idx += 1;
        }
        if let Some(ref agency) = update.agency {
            params.push(libsql::Value::Text(agency.clone()));
            sets.push(format!("agency = ?{idx}"));
            idx += 1;
        }
        if let Some(ref topics) = update.topics {
            params.push(libsql::Value::Text(string_list_to_json(topics)));
            sets.push(format!("topics = ?{idx}"));
            idx += 1;
        }
        if let Some(amount) = update.amount {
            match amount {
                Some(v) => params.push(libsql::Value::Real(v)),
                None => params.push(libsql::Value::Null),
            }
            sets.push(format!("amount = ?{idx}"));
            idx += 1;
        }
        if let Some(deadline) = update.deadline {
            match deadline {
                Some(d) => params.push(libsql::Value::Text(d.to_rfc3339())),
                None => params.push(libsql::Value::Null),
            }
            sets.push(format!("deadline = ?{idx}"));
            idx += 1;
        }
        if let Some(ref url) = update.url {
            match url {
                Some(u) => params.push(libsql::Value::Text(u.clone())),
                None => params.push(libsql::Value::Null),
            }
            sets.push(format!("url = ?{idx}"));
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_funding(funding_id).await;
        }

        params.push(libsql::Value::Text(funding_id.to_string()));
        let sql = format!(
            "UPDATE funding_opportunities SET {} WHERE id = ?{idx}",
            sets.join(", ")
        );

        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_funding(funding_id).await?;

        self.record_audit(EntityType::Funding, funding_id, AuditAction::Updated, None)
            .await?;

        Ok(updated)
    }

    /// List funding opportunities, optionally filtered by status, soonest
    /// deadline first (NULL deadlines last).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_funding(
        &self,
        status: Option<FundingStatus>,
        limit: u32,
    ) -> Result<Vec<FundingOpportunity>, DatabaseError> {
        let mut items = Vec::new();
        match status {
            Some(s) => {
                let sql = format!(
                    "{FUNDING_SELECT} WHERE status = ?1
                     ORDER BY deadline IS NULL, deadline LIMIT ?2"
                );
                let mut rows = self
                    .db()
                    .conn()
                    .query(&sql, libsql::params![s.as_str(), i64::from(limit)])
                    .await?;
                while let Some(row) = rows.next().await? {
                    items.push(row_to_funding(&row)?);
                }
            }
            None => {
                let sql =
                    format!("{FUNDING_SELECT} ORDER BY deadline IS NULL, deadline LIMIT ?1");
                let mut rows = self
                    .db()
                    .conn()
                    .query(&sql, [i64::from(limit)])
                    .await?;
                while let Some(row) = rows.next().await? {
                    items.push(row_to_funding(&row)?);
                }
            }
        }
        Ok(items)
    }

    /// Transition a funding opportunity to a new status.
    ///
    /// Validates the transition via `can_transition_to()`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transition is not allowed.
    pub async fn transition_funding(
        &self,
        funding_id: &str,
        new_status: FundingStatus,
    ) -> Result<FundingOpportunity, DatabaseError> {
        let current = self.get_funding(funding_id).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition funding {} from {} to {}",
                funding_id, current.status, new_status
            )));
        }

        self.db()
            .conn()
            .execute(
                "UPDATE funding_opportunities SET status = ?1 WHERE id = ?2",
                libsql::params![new_status.as_str(), funding_id],
            )
            .await?;

        self.record_audit(
            EntityType::Funding,
            funding_id,
            AuditAction::StatusChanged,
            Some(serde_json::json!({
                "from": current.status.to_string(),
                "to": new_status.to_string(),
            })),
        )
        .await?;

        Ok(FundingOpportunity {
            status: new_status,
            ..current
        })
    }

    /// Open opportunities whose deadline falls within the next `days` days.
    ///
    /// Feeds deadline-warning notifications.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn funding_closing_within(
        &self,
        days: i64,
    ) -> Result<Vec<FundingOpportunity>, DatabaseError> {
        let now = Utc::now();
        let horizon = now + Duration::days(days);

        let sql = format!(
            "{FUNDING_SELECT}
             WHERE status IN ('open', 'closing')
               AND deadline IS NOT NULL AND deadline >= ?1 AND deadline <= ?2
             ORDER BY deadline"
        );
        let mut rows = self
            .db()
            .conn()
            .query(
                &sql,
                libsql::params![now.to_rfc3339(), horizon.to_rfc3339()],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_funding(&row)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use crate::updates::FundingUpdateBuilder;

    fn topics(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn create_funding_roundtrip() {
        let svc = test_service().await;
        let deadline = Utc::now() + Duration::days(60);

        let funding = svc
            .create_funding(
                "ML for Science",
                "NSF",
                &topics(&["machine learning"]),
                Some(500_000.0),
                Some(deadline),
                Some("https://example.org/call"),
            )
            .await
            .unwrap();

        assert!(funding.id.starts_with("fun-"));
        assert_eq!(funding.status, FundingStatus::Open);

        let fetched = svc.get_funding(&funding.id).await.unwrap();
        assert_eq!(fetched.title, "ML for Science");
        assert_eq!(fetched.agency, "NSF");
        assert_eq!(fetched.amount, Some(500_000.0));
        assert!(fetched.deadline.is_some());
    }

    #[tokio::test]
    async fn update_funding_partial() {
        let svc = test_service().await;
        let funding = svc
            .create_funding("Old", "Agency", &[], None, None, None)
            .await
            .unwrap();

        let update = FundingUpdateBuilder::new()
            .title("New")
            .amount(Some(10_000.0))
            .build();
        let updated = svc.update_funding(&funding.id, update).await.unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.amount, Some(10_000.0));
        assert_eq!(updated.agency, "Agency");
    }

    #[tokio::test]
    async fn transition_funding_valid() {
        let svc = test_service().await;
        let funding = svc
            .create_funding("Call", "Agency", &[], None, None, None)
            .await
            .unwrap();

        let closing = svc
            .transition_funding(&funding.id, FundingStatus::Closing)
            .await
            .unwrap();
        assert_eq!(closing.status, FundingStatus::Closing);

        let closed = svc
            .transition_funding(&funding.id, FundingStatus::Closed)
            .await
            .unwrap();
        assert_eq!(closed.status, FundingStatus::Closed);
    }

    #[tokio::test]
    async fn transition_funding_invalid() {
        let svc = test_service().await;
        let funding = svc
            .create_funding("Call", "Agency", &[], None, None, None)
            .await
            .unwrap();

        svc.transition_funding(&funding.id, FundingStatus::Closed)
            .await
            .unwrap();

        let result = svc
            .transition_funding(&funding.id, FundingStatus::Open)
            .await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn list_funding_filters_and_orders() {
        let svc = test_service().await;
        let soon = Utc::now() + Duration::days(5);
        let later = Utc::now() + Duration::days(90);

        svc.create_funding("Later", "A", &[], None, Some(later), None)
            .await
            .unwrap();
        svc.create_funding("Soon", "B", &[], None, Some(soon), None)
            .await
            .unwrap();
        let closed = svc
            .create_funding("Closed", "C", &[], None, None, None)
            .await
            .unwrap();
        svc.transition_funding(&closed.id, FundingStatus::Closed)
            .await
            .unwrap();

        let open = svc
            .list_funding(Some(FundingStatus::Open), 10)
            .await
            .unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].title, "Soon", "soonest deadline first");

        let all = svc.list_funding(None, 10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].title, "Closed", "NULL deadlines sort last");
    }

    #[tokio::test]
    async fn closing_within_window() {
        let svc = test_service().await;

        svc.create_funding("Near", "A", &[], None, Some(Utc::now() + Duration::days(10)), None)
            .await
            .unwrap();
        svc.create_funding("Far", "B", &[], None, Some(Utc::now() + Duration::days(120)), None)
            .await
            .unwrap();
        svc.create_funding("Past", "C", &[], None, Some(Utc::now() - Duration::days(1)), None)
            .await
            .unwrap();

        let closing = svc.funding_closing_within(30).await.unwrap();
        assert_eq!(closing.len(), 1);
        assert_eq!(closing[0].title, "Near");
    }
}
