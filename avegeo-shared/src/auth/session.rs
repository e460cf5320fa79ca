/// Session token management
///
/// Issues, validates, and revokes the opaque tokens that prove an
/// authenticated identity. Tokens carry no claims; every validation is
/// a durable lookup against `session_tokens`, so `revoke_all` takes
/// effect for every concurrent caller the moment the update commits.
/// Expiry is not refreshed implicitly by validation.
///
/// # Token format
///
/// `sess_{32 base62 chars}` — 62^32 ≈ 2^190 possible values, generated
/// from the thread-local cryptographic RNG.
///
/// # Example
///
/// ```no_run
/// use avegeo_shared::auth::session::SessionTokenManager;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let sessions = SessionTokenManager::new(pool);
///
/// let token = sessions.issue("AVE/2024/001").await?;
/// let matric = sessions.validate(&token).await?;
/// assert_eq!(matric, "AVE/2024/001");
///
/// sessions.revoke_all("AVE/2024/001").await?;
/// assert!(sessions.validate(&token).await.is_err());
/// # Ok(())
/// # }
/// ```

use rand::Rng;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::models::session_token::SessionToken;

/// Length of the random part of a session token (characters)
const TOKEN_RANDOM_LENGTH: usize = 32;

/// Session token prefix
const TOKEN_PREFIX: &str = "sess_";

/// Total length of a session token
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new opaque session token string
///
/// Base62 charset keeps tokens header-safe.
pub fn generate_session_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("{}{}", TOKEN_PREFIX, random_part)
}

/// Issues, validates, and revokes session tokens for user identities
#[derive(Clone)]
pub struct SessionTokenManager {
    pool: PgPool,
}

impl SessionTokenManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issues a new token bound to a user and persists it
    pub async fn issue(&self, user_matric: &str) -> CoreResult<String> {
        let token = generate_session_token();
        SessionToken::create(&self.pool, &token, user_matric).await?;

        debug!(user_matric, "Issued session token");
        Ok(token)
    }

    /// Validates a token and resolves the owning user's matric
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Authentication` if the token is unknown or
    /// has been revoked.
    pub async fn validate(&self, token: &str) -> CoreResult<String> {
        let session = SessionToken::find_by_token(&self.pool, token)
            .await?
            .ok_or_else(|| {
                CoreError::Authentication("Invalid session. Please log in again.".to_string())
            })?;

        if !session.is_active {
            return Err(CoreError::Authentication(
                "Session has been revoked. Please log in again.".to_string(),
            ));
        }

        Ok(session.user_matric)
    }

    /// Revokes every token owned by a user
    ///
    /// Called whenever the user's password changes; no token is
    /// accepted after the revocation is durably recorded.
    pub async fn revoke_all(&self, user_matric: &str) -> CoreResult<u64> {
        let revoked = SessionToken::deactivate_all_for_user(&self.pool, user_matric).await?;
        debug!(user_matric, revoked, "Revoked session tokens");
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let token = generate_session_token();
        assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
        assert!(token.starts_with(TOKEN_PREFIX));
        assert!(token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }

    // issue/validate/revoke_all run against a live database in the
    // service_flow_tests suite; they contain no decision logic beyond
    // the lookup
}
