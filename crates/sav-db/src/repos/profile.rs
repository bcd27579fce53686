//! Research profile repository — CRUD + weighted interest management.
//!
//! Interest weights are the personalization signal for adaptive retrieval.
//! They always stay within `[0, 1]`: `set_interest` clamps, `bump_interest`
//! clamps after adding the delta, and `decay_interests` multiplies by a
//! factor in `[0, 1]`.

use chrono::Utc;

use sav_core::entities::{Interest, ResearchProfile};
use sav_core::enums::{AuditAction, EntityType};
use sav_core::ids::PREFIX_PROFILE;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::SavService;
use crate::updates::ProfileUpdate;

fn row_to_profile(row: &libsql::Row) -> Result<ResearchProfile, DatabaseError> {
    Ok(ResearchProfile {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        affiliation: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_interest(row: &libsql::Row) -> Result<Interest, DatabaseError> {
    Ok(Interest {
        profile_id: row.get::<String>(0)?,
        keyword: row.get::<String>(1)?,
        weight: row.get::<f64>(2)?,
        updated_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl SavService {
    /// Create a new research profile.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_profile(
        &self,
        name: &str,
        affiliation: Option<&str>,
    ) -> Result<ResearchProfile, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PROFILE).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO profiles (id, name, affiliation, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                libsql::params![id.as_str(), name, affiliation, now.to_rfc3339()],
            )
            .await?;

        self.record_audit(EntityType::Profile, &id, AuditAction::Created, None)
            .await?;

        Ok(ResearchProfile {
            id,
            name: name.to_string(),
            affiliation: affiliation.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the profile does not exist.
    pub async fn get_profile(&self, id: &str) -> Result<ResearchProfile, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, affiliation, created_at, updated_at
                 FROM profiles WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_profile(&row)
    }

    /// Update a profile with dynamic SET clauses.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails or the profile is not found.
    pub async fn update_profile(
        &self,
        profile_id: &str,
        update: ProfileUpdate,
    ) -> Result<ResearchProfile, DatabaseError> {
        let now = Utc::now();
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            params.push(libsql::Value::Text(name.clone()));
            sets.push(format!("name = ?{idx}"));
            idx += 1;
        }
        if let Some(ref affiliation) = update.affiliation {
            match affiliation {
                Some(a) => params.push(libsql::Value::Text(a.clone())),
                None => params.push(libsql::Value::Null),
            }
            sets.push(format!("affiliation = ?{idx}"));
            idx += 1;
        }

        params.push(libsql::Value::Text(now.to_rfc3339()));
        sets.push(format!("updated_at = ?{idx}"));
        idx += 1;

        params.push(libsql::Value::Text(profile_id.to_string()));
        let sql = format!("UPDATE profiles SET {} WHERE id = ?{idx}", sets.join(", "));

        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_profile(profile_id).await?;

        self.record_audit(EntityType::Profile, profile_id, AuditAction::Updated, None)
            .await?;

        Ok(updated)
    }

    /// Delete a profile. Interests and feedback cascade via foreign keys.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_profile(&self, profile_id: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute("DELETE FROM profiles WHERE id = ?1", [profile_id])
            .await?;

        self.record_audit(EntityType::Profile, profile_id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }

    /// List profiles ordered by creation date descending.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_profiles(&self, limit: u32) -> Result<Vec<ResearchProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, affiliation, created_at, updated_at
                 FROM profiles ORDER BY created_at DESC LIMIT ?1",
                [i64::from(limit)],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_profile(&row)?);
        }
        Ok(items)
    }

    /// Upsert an interest keyword with an explicit weight (clamped to `[0, 1]`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the upsert fails.
    pub async fn set_interest(
        &self,
        profile_id: &str,
        keyword: &str,
        weight: f64,
    ) -> Result<Interest, DatabaseError> {
        let now = Utc::now();
        let weight = weight.clamp(0.0, 1.0);
        let keyword = keyword.to_lowercase();

        self.db()
            .conn()
            .execute(
                "INSERT INTO profile_interests (profile_id, keyword, weight, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (profile_id, keyword)
                 DO UPDATE SET weight = excluded.weight, updated_at = excluded.updated_at",
                libsql::params![profile_id, keyword.as_str(), weight, now.to_rfc3339()],
            )
            .await?;

        self.record_audit(
            EntityType::Profile,
            profile_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "interest": keyword, "weight": weight })),
        )
        .await?;

        Ok(Interest {
            profile_id: profile_id.to_string(),
            keyword,
            weight,
            updated_at: now,
        })
    }

    /// Nudge an interest weight by `delta`, clamping the result to `[0, 1]`.
    ///
    /// Creates the interest at `max(delta, 0)` if it does not exist yet, so
    /// positive feedback can introduce new interests but dismissals cannot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the upsert fails.
    pub async fn bump_interest(
        &self,
        profile_id: &str,
        keyword: &str,
        delta: f64,
    ) -> Result<Interest, DatabaseError> {
        let keyword = keyword.to_lowercase();
        let current = self
            .interests(profile_id)
            .await?
            .into_iter()
            .find(|i| i.keyword == keyword)
            .map(|i| i.weight);

        let new_weight = match current {
            Some(w) => (w + delta).clamp(0.0, 1.0),
            None => delta.clamp(0.0, 1.0),
        };
        self.set_interest(profile_id, &keyword, new_weight).await
    }

    /// Multiply all interest weights for a profile by `factor` in `[0, 1]`.
    ///
    /// Used to let stale interests fade as feedback accumulates elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if `factor` is out of range,
    /// or `DatabaseError` if the UPDATE fails.
    pub async fn decay_interests(
        &self,
        profile_id: &str,
        factor: f64,
    ) -> Result<(), DatabaseError> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(DatabaseError::InvalidState(format!(
                "decay factor {factor} outside [0, 1]"
            )));
        }

        self.db()
            .conn()
            .execute(
                "UPDATE profile_interests SET weight = weight * ?1, updated_at = ?2
                 WHERE profile_id = ?3",
                libsql::params![factor, Utc::now().to_rfc3339(), profile_id],
            )
            .await?;

        self.record_audit(
            EntityType::Profile,
            profile_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "decay": factor })),
        )
        .await?;
        Ok(())
    }

    /// All interests for a profile, heaviest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn interests(&self, profile_id: &str) -> Result<Vec<Interest>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT profile_id, keyword, weight, updated_at
                 FROM profile_interests WHERE profile_id = ?1
                 ORDER BY weight DESC, keyword",
                [profile_id],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_interest(&row)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use crate::updates::ProfileUpdateBuilder;

    #[tokio::test]
    async fn create_profile_roundtrip() {
        let svc = test_service().await;

        let profile = svc
            .create_profile("Ada Lovelace", Some("Analytical Engine Lab"))
            .await
            .unwrap();

        assert!(profile.id.starts_with("prf-"));
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.affiliation.as_deref(), Some("Analytical Engine Lab"));

        let fetched = svc.get_profile(&profile.id).await.unwrap();
        assert_eq!(fetched.id, profile.id);
        assert_eq!(fetched.name, profile.name);
        assert_eq!(fetched.affiliation, profile.affiliation);
    }

    #[tokio::test]
    async fn update_profile_partial() {
        let svc = test_service().await;
        let profile = svc.create_profile("Original", None).await.unwrap();

        let update = ProfileUpdateBuilder::new().name("Renamed").build();
        let updated = svc.update_profile(&profile.id, update).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.affiliation, None);
    }

    #[tokio::test]
    async fn update_profile_clear_affiliation() {
        let svc = test_service().await;
        let profile = svc
            .create_profile("Name", Some("Somewhere"))
            .await
            .unwrap();

        let update = ProfileUpdateBuilder::new().affiliation(None).build();
        let updated = svc.update_profile(&profile.id, update).await.unwrap();

        assert_eq!(updated.affiliation, None);
    }

    #[tokio::test]
    async fn delete_profile_cascades_interests() {
        let svc = test_service().await;
        let profile = svc.create_profile("Transient", None).await.unwrap();
        svc.set_interest(&profile.id, "ml", 0.8).await.unwrap();

        svc.delete_profile(&profile.id).await.unwrap();

        let result = svc.get_profile(&profile.id).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));

        let interests = svc.interests(&profile.id).await.unwrap();
        assert!(interests.is_empty(), "interests should cascade on delete");
    }

    #[tokio::test]
    async fn list_profiles() {
        let svc = test_service().await;
        svc.create_profile("One", None).await.unwrap();
        svc.create_profile("Two", None).await.unwrap();

        let profiles = svc.list_profiles(10).await.unwrap();
        assert_eq!(profiles.len(), 2);
    }

    #[tokio::test]
    async fn set_interest_clamps_weight() {
        let svc = test_service().await;
        let profile = svc.create_profile("Clamp", None).await.unwrap();

        let interest = svc.set_interest(&profile.id, "NLP", 1.7).await.unwrap();
        assert!((interest.weight - 1.0).abs() < f64::EPSILON);
        assert_eq!(interest.keyword, "nlp", "keywords are lowercased");

        let interest = svc.set_interest(&profile.id, "nlp", -0.2).await.unwrap();
        assert!(interest.weight.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn bump_interest_existing_and_new() {
        let svc = test_service().await;
        let profile = svc.create_profile("Bumper", None).await.unwrap();

        svc.set_interest(&profile.id, "retrieval", 0.5)
            .await
            .unwrap();
        let bumped = svc
            .bump_interest(&profile.id, "retrieval", 0.3)
            .await
            .unwrap();
        assert!((bumped.weight - 0.8).abs() < 1e-9);

        // New keyword from positive feedback
        let fresh = svc.bump_interest(&profile.id, "ranking", 0.4).await.unwrap();
        assert!((fresh.weight - 0.4).abs() < 1e-9);

        // Negative delta on a missing keyword must not create a negative weight
        let negative = svc
            .bump_interest(&profile.id, "unseen", -0.3)
            .await
            .unwrap();
        assert!(negative.weight.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn bump_interest_clamps_at_bounds() {
        let svc = test_service().await;
        let profile = svc.create_profile("Bounds", None).await.unwrap();

        svc.set_interest(&profile.id, "topic", 0.9).await.unwrap();
        let high = svc.bump_interest(&profile.id, "topic", 0.5).await.unwrap();
        assert!((high.weight - 1.0).abs() < f64::EPSILON);

        let low = svc.bump_interest(&profile.id, "topic", -2.0).await.unwrap();
        assert!(low.weight.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn decay_interests_scales_all() {
        let svc = test_service().await;
        let profile = svc.create_profile("Decay", None).await.unwrap();

        svc.set_interest(&profile.id, "a", 0.8).await.unwrap();
        svc.set_interest(&profile.id, "b", 0.4).await.unwrap();

        svc.decay_interests(&profile.id, 0.5).await.unwrap();

        let interests = svc.interests(&profile.id).await.unwrap();
        let a = interests.iter().find(|i| i.keyword == "a").unwrap();
        let b = interests.iter().find(|i| i.keyword == "b").unwrap();
        assert!((a.weight - 0.4).abs() < 1e-9);
        assert!((b.weight - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn decay_factor_out_of_range_rejected() {
        let svc = test_service().await;
        let profile = svc.create_profile("Decay", None).await.unwrap();

        let result = svc.decay_interests(&profile.id, 1.5).await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn interests_ordered_by_weight() {
        let svc = test_service().await;
        let profile = svc.create_profile("Order", None).await.unwrap();

        svc.set_interest(&profile.id, "light", 0.2).await.unwrap();
        svc.set_interest(&profile.id, "heavy", 0.9).await.unwrap();

        let interests = svc.interests(&profile.id).await.unwrap();
        assert_eq!(interests[0].keyword, "heavy");
        assert_eq!(interests[1].keyword, "light");
    }
}
