/// Geofence model and database operations
///
/// A geofence is a named, time-boxed circular region created by an
/// admin. Students join it with a 6-character code. The status machine
/// is one-way: `active -> inactive`, no reactivation path.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE geofences (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     creator_matric VARCHAR(50) NOT NULL REFERENCES users(matric),
///     start_time TIMESTAMPTZ NOT NULL,
///     end_time TIMESTAMPTZ NOT NULL,
///     latitude DOUBLE PRECISION NOT NULL,
///     longitude DOUBLE PRECISION NOT NULL,
///     radius_m DOUBLE PRECISION NOT NULL,
///     join_code VARCHAR(6) NOT NULL,
///     status TEXT NOT NULL CHECK (status IN ('active', 'inactive')),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// -- join codes only collide while both geofences are still active
/// CREATE UNIQUE INDEX geofences_active_join_code
///     ON geofences (join_code) WHERE status = 'active';
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Lifecycle status of a geofence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GeofenceStatus {
    /// Accepting attendance submissions
    Active,

    /// Deactivated by its creator; terminal
    Inactive,
}

impl GeofenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceStatus::Active => "active",
            GeofenceStatus::Inactive => "inactive",
        }
    }
}

/// Geofence model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Geofence {
    /// Row id
    pub id: Uuid,

    /// Class/course name
    pub name: String,

    /// Matric of the admin who created the geofence
    pub creator_matric: String,

    /// Start of the attendance window (UTC)
    pub start_time: DateTime<Utc>,

    /// End of the attendance window (UTC)
    pub end_time: DateTime<Utc>,

    /// Center latitude in degrees
    pub latitude: f64,

    /// Center longitude in degrees
    pub longitude: f64,

    /// Radius in meters
    pub radius_m: f64,

    /// 6-character lowercase join code
    pub join_code: String,

    /// Current lifecycle status
    pub status: GeofenceStatus,

    /// When the geofence was created
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a geofence
///
/// Timestamps must already be normalized to UTC and the join code
/// lowercased; the lifecycle service does both.
#[derive(Debug, Clone)]
pub struct CreateGeofence {
    pub name: String,
    pub creator_matric: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub join_code: String,
}

impl Geofence {
    /// Inserts a new geofence as `active`
    ///
    /// # Errors
    ///
    /// Returns an error on a join-code collision with another active
    /// geofence (partial unique index) or any other database failure.
    /// The lifecycle service treats the collision as retryable.
    pub async fn create(pool: &PgPool, data: CreateGeofence) -> Result<Self, sqlx::Error> {
        let geofence = sqlx::query_as::<_, Geofence>(
            r#"
            INSERT INTO geofences
                (name, creator_matric, start_time, end_time,
                 latitude, longitude, radius_m, join_code, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active')
            RETURNING id, name, creator_matric, start_time, end_time,
                      latitude, longitude, radius_m, join_code, status, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.creator_matric)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.radius_m)
        .bind(data.join_code)
        .fetch_one(pool)
        .await?;

        Ok(geofence)
    }

    /// Finds a geofence by name scheduled on a given calendar date (UTC)
    pub async fn find_by_name_and_date(
        pool: &PgPool,
        name: &str,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let geofence = sqlx::query_as::<_, Geofence>(
            r#"
            SELECT id, name, creator_matric, start_time, end_time,
                   latitude, longitude, radius_m, join_code, status, created_at
            FROM geofences
            WHERE name = $1 AND (start_time AT TIME ZONE 'UTC')::date = $2
            "#,
        )
        .bind(name)
        .bind(date)
        .fetch_optional(pool)
        .await?;

        Ok(geofence)
    }

    /// Finds a geofence by join code, regardless of status
    ///
    /// Codes are matched case-insensitively; callers may pass uppercase
    /// input as typed by a student.
    pub async fn find_by_join_code(pool: &PgPool, code: &str) -> Result<Option<Self>, sqlx::Error> {
        let geofence = sqlx::query_as::<_, Geofence>(
            r#"
            SELECT id, name, creator_matric, start_time, end_time,
                   latitude, longitude, radius_m, join_code, status, created_at
            FROM geofences
            WHERE join_code = LOWER($1)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(geofence)
    }

    /// Lists all geofences, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let geofences = sqlx::query_as::<_, Geofence>(
            r#"
            SELECT id, name, creator_matric, start_time, end_time,
                   latitude, longitude, radius_m, join_code, status, created_at
            FROM geofences
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(geofences)
    }

    /// Lists geofences created by one admin, newest first
    pub async fn list_by_creator(
        pool: &PgPool,
        creator_matric: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let geofences = sqlx::query_as::<_, Geofence>(
            r#"
            SELECT id, name, creator_matric, start_time, end_time,
                   latitude, longitude, radius_m, join_code, status, created_at
            FROM geofences
            WHERE creator_matric = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_matric)
        .fetch_all(pool)
        .await?;

        Ok(geofences)
    }

    /// Transitions a geofence to `inactive`
    ///
    /// Returns true if a row was updated. The transition is one-way;
    /// there is no query that sets a geofence back to `active`.
    pub async fn set_inactive(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE geofences
            SET status = 'inactive'
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(GeofenceStatus::Active.as_str(), "active");
        assert_eq!(GeofenceStatus::Inactive.as_str(), "inactive");
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&GeofenceStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::from_str::<GeofenceStatus>("\"inactive\"").unwrap(),
            GeofenceStatus::Inactive
        );
    }

    // Integration tests for the query methods require a running database
}
