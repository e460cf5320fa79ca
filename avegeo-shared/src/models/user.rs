/// User model and database operations
///
/// Users are keyed by their matric, the unique human-facing identifier
/// issued by the institution. Emails are unique as well; lookups accept
/// either.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     matric VARCHAR(50) PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     username VARCHAR(100) NOT NULL,
///     role TEXT NOT NULL CHECK (role IN ('admin', 'student')),
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Role of a user account
///
/// Admins create and manage geofences; students record attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can create, list, and deactivate geofences and view attendances
    Admin,

    /// Can record attendance against active geofences
    Student,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }
}

/// User model representing a student or admin account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique human-facing identifier ("matric")
    pub matric: String,

    /// Email address, unique across all users
    pub email: String,

    /// Display name
    pub username: String,

    /// Account role
    pub role: UserRole,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub matric: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub password_hash: String,
}

impl User {
    /// Creates a new user at registration
    ///
    /// # Errors
    ///
    /// Returns an error if the matric or email already exists (unique
    /// constraint violation) or the database write fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (matric, email, username, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING matric, email, username, role, password_hash, created_at
            "#,
        )
        .bind(data.matric)
        .bind(data.email)
        .bind(data.username)
        .bind(data.role)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email or matric
    ///
    /// Either argument may be `None`; a row matches when it equals any
    /// supplied value. Returns `None` when no user matches.
    pub async fn find_by_email_or_matric(
        pool: &PgPool,
        email: Option<&str>,
        matric: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT matric, email, username, role, password_hash, created_at
            FROM users
            WHERE email = $1 OR matric = $2
            "#,
        )
        .bind(email)
        .bind(matric)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by matric alone
    pub async fn find_by_matric(pool: &PgPool, matric: &str) -> Result<Option<Self>, sqlx::Error> {
        Self::find_by_email_or_matric(pool, None, Some(matric)).await
    }

    /// Replaces a user's password hash
    ///
    /// Returns true if a row was updated, false if the user does not
    /// exist. Session revocation on password change is the caller's
    /// responsibility (see the account service).
    pub async fn update_password_hash(
        pool: &PgPool,
        email: &str,
        new_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(new_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Student.as_str(), "student");
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<UserRole>("\"student\"").unwrap(),
            UserRole::Student
        );
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            matric: "AVE/2024/001".to_string(),
            email: "a@example.edu".to_string(),
            username: "Ada".to_string(),
            role: UserRole::Student,
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }

    // Integration tests for the query methods require a running database
}
