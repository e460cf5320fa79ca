/// Password reset tokens
///
/// A reset token is an HS256-signed claims payload shadowed by a
/// persisted single-use record. The signature proves authenticity and
/// carries expiry; the record carries consumption state. Both must
/// agree for a token to be accepted:
///
/// 1. The persisted record is checked FIRST — an absent or already-used
///    record rejects before any signature work happens, so stale tokens
///    are never processed.
/// 2. The signature and expiry are then verified. A verification
///    failure deactivates the persisted record (fail closed) before the
///    error is reported, so the same token cannot be replayed against a
///    later, possibly successful, verification.
/// 3. On success the record is marked used; consumption is exactly
///    once, even under concurrent validation.
///
/// Issuing a new token marks the user's previous live token used inside
/// the same transaction as the insert, so at most one live token exists
/// per user at any time.
///
/// State machine: `issued -> used` (consumption or invalidation) or
/// `issued -> expired` (detected at validate time by the expiry check;
/// expired rows are not actively swept).

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::models::reset_token::PasswordResetToken;

/// Default time-to-live for a reset token
pub const DEFAULT_RESET_TTL_MINUTES: i64 = 20;

/// Message shown for any token that cannot be accepted
const INVALID_LINK: &str = "Invalid link. Please request a new password reset link.";

/// Claims embedded in a signed reset token
///
/// Every field is required; a payload missing any of them fails to
/// decode and the token is rejected (fail closed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Subject — the user's email address
    pub sub: String,

    /// Display name, used by the notification layer
    pub username: String,

    /// The user's matric
    pub matric: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl ResetClaims {
    /// Creates claims expiring `ttl` from now
    pub fn new(email: &str, username: &str, matric: &str, ttl: Duration) -> Self {
        Self {
            sub: email.to_string(),
            username: username.to_string(),
            matric: matric.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// Expiry as a UTC timestamp, mirrored onto the persisted record
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Signs reset claims into a token string
pub fn sign_reset_claims(claims: &ResetClaims, secret: &str) -> Result<String, CoreError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| CoreError::Internal(format!("reset token signing failed: {}", e)))
}

/// Verifies a token's signature and expiry and extracts its claims
///
/// # Errors
///
/// Returns `CoreError::Authentication` for any bad token: tampered
/// signature, expired, or claims missing a required field.
pub fn verify_reset_claims(token: &str, secret: &str) -> CoreResult<ResetClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<ResetClaims>(token, &key, &validation)
        .map_err(|_| CoreError::Authentication(INVALID_LINK.to_string()))?;

    Ok(data.claims)
}

/// Issues and consumes single-use password-reset tokens
#[derive(Clone)]
pub struct PasswordResetTokenManager {
    pool: PgPool,
    secret: String,
    ttl: Duration,
}

impl PasswordResetTokenManager {
    /// Creates a manager with the default 20-minute TTL
    pub fn new(pool: PgPool, secret: impl Into<String>) -> Self {
        Self::with_ttl(pool, secret, Duration::minutes(DEFAULT_RESET_TTL_MINUTES))
    }

    /// Creates a manager with a custom TTL
    pub fn with_ttl(pool: PgPool, secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            pool,
            secret: secret.into(),
            ttl,
        }
    }

    /// Issues a new reset token for a user
    ///
    /// Any previously live token for the user is marked used in the
    /// same transaction, so it can never validate again even if it has
    /// not expired.
    pub async fn issue(&self, email: &str, username: &str, matric: &str) -> CoreResult<String> {
        let claims = ResetClaims::new(email, username, matric, self.ttl);
        let token = sign_reset_claims(&claims, &self.secret)?;

        let mut tx = self.pool.begin().await?;

        let superseded = PasswordResetToken::mark_used_for_user(&mut tx, matric).await?;
        if superseded > 0 {
            debug!(matric, superseded, "Superseded prior reset token");
        }

        PasswordResetToken::create(&mut tx, matric, &token, claims.expires_at()).await?;
        tx.commit().await?;

        Ok(token)
    }

    /// Validates a token, consumes it, and returns the embedded claims
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Authentication` if the persisted record is
    /// absent or already used, the signature fails, the token has
    /// expired, or a concurrent validation consumed the record first.
    pub async fn validate(&self, token: &str) -> CoreResult<ResetClaims> {
        // Persisted record check comes before any signature work so an
        // already-consumed token is never re-processed
        let record = PasswordResetToken::find_by_token(&self.pool, token)
            .await?
            .ok_or_else(|| CoreError::Authentication(INVALID_LINK.to_string()))?;

        if record.is_used {
            return Err(CoreError::Authentication(INVALID_LINK.to_string()));
        }

        let claims = match verify_reset_claims(token, &self.secret) {
            Ok(claims) => claims,
            Err(err) => {
                // Fail closed: a token that failed verification must not
                // stay live for a later replay
                warn!(matric = %record.user_matric, "Reset token failed verification; deactivating");
                PasswordResetToken::mark_used(&self.pool, token).await?;
                return Err(err);
            }
        };

        // Single consumption: the row update is the arbiter when two
        // validations race
        let consumed = PasswordResetToken::mark_used(&self.pool, token).await?;
        if !consumed {
            return Err(CoreError::Authentication(INVALID_LINK.to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_sign_verify_roundtrip() {
        let claims = ResetClaims::new(
            "ada@example.edu",
            "Ada",
            "AVE/2024/001",
            Duration::minutes(20),
        );
        let token = sign_reset_claims(&claims, SECRET).expect("Should sign");

        let verified = verify_reset_claims(&token, SECRET).expect("Should verify");
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = ResetClaims::new("a@b.edu", "A", "M1", Duration::minutes(20));
        let token = sign_reset_claims(&claims, SECRET).unwrap();

        let result = verify_reset_claims(&token, "another-secret-key-32-bytes-long!!");
        assert!(matches!(result, Err(CoreError::Authentication(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Far enough in the past to clear any validation leeway
        let claims = ResetClaims::new("a@b.edu", "A", "M1", Duration::minutes(-10));
        let token = sign_reset_claims(&claims, SECRET).unwrap();

        let result = verify_reset_claims(&token, SECRET);
        assert!(matches!(result, Err(CoreError::Authentication(_))));
    }

    #[test]
    fn test_missing_claim_fails_closed() {
        // Payload lacking the matric field must not decode
        let partial = serde_json::json!({
            "sub": "a@b.edu",
            "username": "A",
            "exp": (Utc::now() + Duration::minutes(20)).timestamp(),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &partial,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = verify_reset_claims(&token, SECRET);
        assert!(matches!(result, Err(CoreError::Authentication(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let claims = ResetClaims::new("a@b.edu", "A", "M1", Duration::minutes(20));
        let token = sign_reset_claims(&claims, SECRET).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('a') { 'b' } else { 'a' });

        assert!(verify_reset_claims(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_expires_at_mirrors_exp() {
        let claims = ResetClaims::new("a@b.edu", "A", "M1", Duration::minutes(20));
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }
}
