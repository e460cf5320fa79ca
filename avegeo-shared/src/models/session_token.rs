/// Session token model and database operations
///
/// Session tokens are opaque strings issued at login. Validation is
/// always a durable lookup — there is no in-memory cache of validity —
/// so deactivating a user's tokens is immediately visible to every
/// concurrent caller.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE session_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token VARCHAR(64) NOT NULL UNIQUE,
///     user_matric VARCHAR(50) NOT NULL REFERENCES users(matric),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A persisted session token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionToken {
    /// Row id
    pub id: Uuid,

    /// The opaque token string handed to the client
    pub token: String,

    /// Owning user
    pub user_matric: String,

    /// False once revoked; inactive tokens never validate again
    pub is_active: bool,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// Persists a freshly issued token
    pub async fn create(
        pool: &PgPool,
        token: &str,
        user_matric: &str,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO session_tokens (token, user_matric)
            VALUES ($1, $2)
            RETURNING id, token, user_matric, is_active, created_at
            "#,
        )
        .bind(token)
        .bind(user_matric)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Looks up a token string
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, SessionToken>(
            r#"
            SELECT id, token, user_matric, is_active, created_at
            FROM session_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Marks every token owned by a user inactive
    ///
    /// Called on password change to force re-authentication everywhere.
    /// Returns the number of tokens revoked.
    pub async fn deactivate_all_for_user(
        pool: &PgPool,
        user_matric: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE session_tokens
            SET is_active = FALSE
            WHERE user_matric = $1 AND is_active = TRUE
            "#,
        )
        .bind(user_matric)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
