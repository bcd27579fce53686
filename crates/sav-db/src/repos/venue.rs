//! Publication venue repository — CRUD over venue metadata.

use chrono::Utc;

use sav_core::entities::PublicationVenue;
use sav_core::enums::{AuditAction, EntityType, VenueKind};
use sav_core::ids::PREFIX_VENUE;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum, parse_string_list, string_list_to_json};
use crate::service::SavService;
use crate::updates::VenueUpdate;

fn row_to_venue(row: &libsql::Row) -> Result<PublicationVenue, DatabaseError> {
    Ok(PublicationVenue {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        kind: parse_enum(&row.get::<String>(2)?)?,
        topics: parse_string_list(&row.get::<String>(3)?)?,
        impact_factor: row.get::<Option<f64>>(4)?,
        acceptance_rate: row.get::<Option<f64>>(5)?,
        open_access: row.get::<i64>(6)? != 0,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl SavService {
    /// Create a publication venue.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_venue(
        &self,
        name: &str,
        kind: VenueKind,
        topics: &[String],
        impact_factor: Option<f64>,
        acceptance_rate: Option<f64>,
        open_access: bool,
    ) -> Result<PublicationVenue, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_VENUE).await?;
        let topics_json = string_list_to_json(topics);

        self.db()
            .conn()
            .execute(
                "INSERT INTO venues (id, name, kind, topics, impact_factor, acceptance_rate, open_access, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    name,
                    kind.as_str(),
                    topics_json.as_str(),
                    impact_factor,
                    acceptance_rate,
                    i64::from(open_access),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.record_audit(EntityType::Venue, &id, AuditAction::Created, None)
            .await?;

        Ok(PublicationVenue {
            id,
            name: name.to_string(),
            kind,
            topics: topics.to_vec(),
            impact_factor,
            acceptance_rate,
            open_access,
            created_at: now,
        })
    }

    /// Get a venue by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the venue does not exist.
    pub async fn get_venue(&self, id: &str) -> Result<PublicationVenue, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, kind, topics, impact_factor, acceptance_rate, open_access, created_at
                 FROM venues WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_venue(&row)
    }

    /// Update a venue with dynamic SET clauses.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails or the venue is not found.
    pub async fn update_venue(
        &self,
        venue_id: &str,
        update: VenueUpdate,
    ) -> Result<PublicationVenue, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            params.push(libsql::Value::Text(name.clone()));
            sets.push(format!("name = ?{idx}"));
            idx += 1;
        }
        if let Some(ref topics) = update.topics {
            params.push(libsql::Value::Text(string_list_to_json(topics)));
            sets.push(format!("topics = ?{idx}"));
            idx += 1;
        }
        if let Some(impact_factor) = update.impact_factor {
            match impact_factor {
                Some(v) => params.push(libsql::Value::Real(v)),
                None => params.push(libsql::Value::Null),
            }
            sets.push(format!("impact_factor = ?{idx}"));
            idx += 1;
        }
        if let Some(acceptance_rate) = update.acceptance_rate {
            match acceptance_rate {
                Some(v) => params.push(libsql::Value::Real(v)),
                None => params.push(libsql::Value::Null),
            }
            sets.push(format!("acceptance_rate = ?{idx}"));
            idx += 1;
        }
        if let Some(open_access) = update.open_access {
            params.push(libsql::Value::Integer(i64::from(open_access)));
            sets.push(format!("open_access = ?{idx}"));
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_venue(venue_id).await;
        }

        params.push(libsql::Value::Text(venue_id.to_string()));
        let sql = format!("UPDATE venues SET {} WHERE id = ?{idx}", sets.join(", "));

        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_venue(venue_id).await?;

        self.record_audit(EntityType::Venue, venue_id, AuditAction::Updated, None)
            .await?;

        Ok(updated)
    }

    /// Delete a venue.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_venue(&self, id: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute("DELETE FROM venues WHERE id = ?1", [id])
            .await?;
        self.record_audit(EntityType::Venue, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }

    /// List venues ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_venues(&self, limit: u32) -> Result<Vec<PublicationVenue>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, kind, topics, impact_factor, acceptance_rate, open_access, created_at
                 FROM venues ORDER BY name LIMIT ?1",
                [i64::from(limit)],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_venue(&row)?);
        }
        Ok(items)
    }
}
