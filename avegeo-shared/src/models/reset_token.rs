/// Password reset token model and database operations
///
/// Each row shadows one signed reset token. The signature carries the
/// claims; the row carries the consumption state. A token is *live*
/// while it is unused and unexpired, and at most one live token exists
/// per user: issuing a new one marks the previous row used first,
/// inside the same transaction as the insert.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE password_reset_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_matric VARCHAR(50) NOT NULL REFERENCES users(matric),
///     token VARCHAR(512) NOT NULL UNIQUE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     is_used BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// A persisted password-reset token record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PasswordResetToken {
    /// Row id
    pub id: Uuid,

    /// Owning user
    pub user_matric: String,

    /// The full signed token string, stored verbatim
    pub token: String,

    /// Expiry embedded in the signature, mirrored for inspection
    pub expires_at: DateTime<Utc>,

    /// True once consumed or invalidated; terminal
    pub is_used: bool,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Inserts a new token row within the issuing transaction
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_matric: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_matric, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_matric, token, expires_at, is_used, created_at
            "#,
        )
        .bind(user_matric)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    /// Looks up a token row by its exact token string
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_matric, token, expires_at, is_used, created_at
            FROM password_reset_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Marks a token used by its token string
    ///
    /// Used both for single consumption on a successful password change
    /// and for failing closed when signature verification rejects a
    /// persisted token. Returns true if a row transitioned.
    pub async fn mark_used(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET is_used = TRUE
            WHERE token = $1 AND is_used = FALSE
            "#,
        )
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks a user's live token used within the issuing transaction
    ///
    /// Sequenced before the new insert so two simultaneously valid
    /// tokens can never exist for one user.
    pub async fn mark_used_for_user(
        tx: &mut Transaction<'_, Postgres>,
        user_matric: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET is_used = TRUE
            WHERE user_matric = $1 AND is_used = FALSE
            "#,
        )
        .bind(user_matric)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
