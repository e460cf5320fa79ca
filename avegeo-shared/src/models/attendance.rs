/// Attendance record model and database operations
///
/// At most one attendance record may exist per (user, geofence) pair.
/// The idempotency key — join code concatenated with the user's matric
/// — carries a UNIQUE constraint, so two concurrent submissions that
/// both pass the existence check still cannot double-insert: the second
/// insert fails with a unique violation the recorder translates back to
/// the same "already recorded" conflict.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE attendance_records (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_matric VARCHAR(50) NOT NULL REFERENCES users(matric),
///     join_code VARCHAR(6) NOT NULL,
///     geofence_name VARCHAR(255) NOT NULL,
///     idempotency_key VARCHAR(60) NOT NULL UNIQUE,
///     recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single recorded attendance
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    /// Row id
    pub id: Uuid,

    /// Matric of the student who checked in
    pub user_matric: String,

    /// Join code of the geofence checked into
    pub join_code: String,

    /// Geofence name, denormalized for per-student listings
    pub geofence_name: String,

    /// Unique key: join code + matric
    pub idempotency_key: String,

    /// When the attendance was recorded
    pub recorded_at: DateTime<Utc>,
}

/// One row of a creator-facing attendance listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceEntry {
    /// Student matric
    pub user_matric: String,

    /// Student display name
    pub username: String,

    /// Join code of the geofence
    pub join_code: String,
}

/// Builds the idempotency key for a (geofence, user) pair
pub fn idempotency_key(join_code: &str, user_matric: &str) -> String {
    format!("{}{}", join_code, user_matric)
}

impl AttendanceRecord {
    /// Inserts a new attendance record
    ///
    /// # Errors
    ///
    /// A unique violation on `idempotency_key` means a record for this
    /// (user, geofence) already exists — possibly written by a racing
    /// request after the caller's existence check passed.
    pub async fn create(
        pool: &PgPool,
        user_matric: &str,
        join_code: &str,
        geofence_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records
                (user_matric, join_code, geofence_name, idempotency_key)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_matric, join_code, geofence_name,
                      idempotency_key, recorded_at
            "#,
        )
        .bind(user_matric)
        .bind(join_code)
        .bind(geofence_name)
        .bind(idempotency_key(join_code, user_matric))
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Finds an existing record by its idempotency key
    pub async fn find_by_idempotency_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_matric, join_code, geofence_name,
                   idempotency_key, recorded_at
            FROM attendance_records
            WHERE idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Lists the attendances recorded against one geofence, joined with
    /// the student's display name
    pub async fn list_by_join_code(
        pool: &PgPool,
        join_code: &str,
    ) -> Result<Vec<AttendanceEntry>, sqlx::Error> {
        let entries = sqlx::query_as::<_, AttendanceEntry>(
            r#"
            SELECT a.user_matric, u.username, a.join_code
            FROM attendance_records a
            JOIN users u ON u.matric = a.user_matric
            WHERE a.join_code = $1
            ORDER BY a.recorded_at
            "#,
        )
        .bind(join_code)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Lists one student's attendance records, optionally filtered by
    /// geofence name
    pub async fn list_by_user(
        pool: &PgPool,
        user_matric: &str,
        geofence_name: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_matric, join_code, geofence_name,
                   idempotency_key, recorded_at
            FROM attendance_records
            WHERE user_matric = $1
              AND ($2::varchar IS NULL OR geofence_name = $2)
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(user_matric)
        .bind(geofence_name)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_is_code_then_matric() {
        assert_eq!(idempotency_key("a1b2c3", "AVE/2024/001"), "a1b2c3AVE/2024/001");
    }

    #[test]
    fn test_idempotency_key_distinguishes_pairs() {
        // Same student in two classes, two students in one class
        assert_ne!(
            idempotency_key("a1b2c3", "AVE/2024/001"),
            idempotency_key("d4e5f6", "AVE/2024/001")
        );
        assert_ne!(
            idempotency_key("a1b2c3", "AVE/2024/001"),
            idempotency_key("a1b2c3", "AVE/2024/002")
        );
    }

    // Integration tests for the query methods require a running database
}
