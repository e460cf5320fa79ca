/// Account service
///
/// Registration, login, and the password-reset flow. Login accepts a
/// single identifier matched against email or matric; every failed
/// login, whatever the cause, reports the same message so the response
/// never confirms whether an account exists.
///
/// The reset flow spans three operations:
///
/// 1. `request_password_reset` issues a signed single-use token — but
///    returns `None` for an unknown email instead of an error, again to
///    avoid account enumeration. The caller decides whether to send
///    anything.
/// 2. `change_password` consumes the token, installs the new hash, and
///    revokes every live session for the user. Revocation is part of the
///    change, not a courtesy.
/// 3. The notification layer (in the API crate) acts on the returned
///    summaries; this service never sends email itself.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::reset::PasswordResetTokenManager;
use crate::auth::session::SessionTokenManager;
use crate::error::{CoreError, CoreResult};
use crate::models::attendance::AttendanceRecord;
use crate::models::user::{CreateUser, User, UserRole};

/// Message for every failed login
const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Input for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub matric: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub password: String,
}

/// A successful login: the user plus their fresh session token
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session_token: String,
}

/// A reset token ready to be delivered to its owner
#[derive(Debug, Clone)]
pub struct ResetRequest {
    pub token: String,
    pub email: String,
    pub username: String,
}

/// Summary of a completed password change, for notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChanged {
    pub email: String,
    pub username: String,
    pub matric: String,
}

/// Account operations
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
    sessions: SessionTokenManager,
    reset_tokens: PasswordResetTokenManager,
}

impl AccountService {
    pub fn new(
        pool: PgPool,
        sessions: SessionTokenManager,
        reset_tokens: PasswordResetTokenManager,
    ) -> Self {
        Self {
            pool,
            sessions,
            reset_tokens,
        }
    }

    /// Registers a new account
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Conflict` if a user already holds the email
    /// or matric, `CoreError::Validation` for an empty password.
    pub async fn register(&self, request: RegisterRequest) -> CoreResult<User> {
        if request.password.is_empty() {
            return Err(CoreError::Validation(
                "Password must not be empty.".to_string(),
            ));
        }

        let existing = User::find_by_email_or_matric(
            &self.pool,
            Some(&request.email),
            Some(&request.matric),
        )
        .await?;
        if existing.is_some() {
            return Err(CoreError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let data = CreateUser {
            matric: request.matric,
            email: request.email,
            username: request.username,
            role: request.role,
            password_hash,
        };

        let user = match User::create(&self.pool, data).await {
            Ok(user) => user,
            // Racing registration with the same email or matric
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(CoreError::Conflict("User already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        info!(matric = %user.matric, role = user.role.as_str(), "Registered user");
        Ok(user)
    }

    /// Logs a user in by email or matric and issues a session token
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Authentication` with one uniform message for
    /// an unknown identifier and for a wrong password alike.
    pub async fn login(&self, identifier: &str, password: &str) -> CoreResult<LoginOutcome> {
        let user =
            User::find_by_email_or_matric(&self.pool, Some(identifier), Some(identifier))
                .await?
                .ok_or_else(|| CoreError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(CoreError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let session_token = self.sessions.issue(&user.matric).await?;

        info!(matric = %user.matric, "User logged in");
        Ok(LoginOutcome {
            user,
            session_token,
        })
    }

    /// Validates a session token and resolves the authenticated user
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Authentication` for an unknown or revoked
    /// token, `CoreError::NotFound` if the owning account has since
    /// been removed.
    pub async fn authenticate(&self, session_token: &str) -> CoreResult<User> {
        let matric = self.sessions.validate(session_token).await?;

        User::find_by_matric(&self.pool, &matric)
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found.".to_string()))
    }

    /// Starts a password reset for the account holding `email`
    ///
    /// Returns `Ok(None)` when no account holds the email — the caller
    /// reports success either way so the endpoint cannot be used to
    /// enumerate accounts.
    pub async fn request_password_reset(&self, email: &str) -> CoreResult<Option<ResetRequest>> {
        let user = match User::find_by_email_or_matric(&self.pool, Some(email), None).await? {
            Some(user) => user,
            None => {
                warn!(email, "Password reset requested for unknown email");
                return Ok(None);
            }
        };

        let token = self
            .reset_tokens
            .issue(&user.email, &user.username, &user.matric)
            .await?;

        info!(matric = %user.matric, "Issued password reset token");
        Ok(Some(ResetRequest {
            token,
            email: user.email,
            username: user.username,
        }))
    }

    /// Completes a password reset
    ///
    /// Consumes the token, installs the new password hash, and revokes
    /// every live session for the user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Authentication` for any token that cannot be
    /// accepted, `CoreError::Validation` for an empty new password,
    /// `CoreError::NotFound` if the account named by the token is gone.
    pub async fn change_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> CoreResult<PasswordChanged> {
        if new_password.is_empty() {
            return Err(CoreError::Validation(
                "Password must not be empty.".to_string(),
            ));
        }

        // Consumes the token; a second call with the same token fails
        // here even if the update below never runs
        let claims = self.reset_tokens.validate(reset_token).await?;

        let new_hash = hash_password(new_password)?;

        let updated = User::update_password_hash(&self.pool, &claims.sub, &new_hash).await?;
        if !updated {
            return Err(CoreError::NotFound("User not found.".to_string()));
        }

        let revoked = self.sessions.revoke_all(&claims.matric).await?;

        info!(
            matric = %claims.matric,
            revoked_sessions = revoked,
            "Password changed"
        );

        Ok(PasswordChanged {
            email: claims.sub,
            username: claims.username,
            matric: claims.matric,
        })
    }

    /// Lists a user's own attendance records, optionally filtered by
    /// geofence name
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when nothing matches.
    pub async fn my_records(
        &self,
        matric: &str,
        geofence_name: Option<&str>,
    ) -> CoreResult<Vec<AttendanceRecord>> {
        let records = AttendanceRecord::list_by_user(&self.pool, matric, geofence_name).await?;

        if records.is_empty() {
            return Err(CoreError::NotFound(
                "No attendance records found".to_string(),
            ));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_changed_summary_serializes() {
        let changed = PasswordChanged {
            email: "ada@example.edu".to_string(),
            username: "Ada".to_string(),
            matric: "AVE/2024/001".to_string(),
        };

        let json = serde_json::to_value(&changed).expect("Should serialize");
        assert_eq!(json["email"], "ada@example.edu");
        assert_eq!(json["matric"], "AVE/2024/001");
    }

    // register/login/reset flows need a live database and are covered by
    // the service_flow_tests suite in tests/
}
