/// Account endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new account
/// - `POST /v1/auth/login` - Login by email or matric
/// - `POST /v1/auth/forgot-password` - Request a password reset link
/// - `POST /v1/auth/reset-password` - Complete a password reset
///
/// The two reset endpoints never reveal whether an account exists:
/// forgot-password answers the same way for known and unknown emails,
/// and every unusable reset token gets one uniform rejection.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use avegeo_shared::models::user::UserRole;
use avegeo_shared::services::account;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Institutional identifier
    #[validate(length(min = 1, max = 50, message = "Matric must be 1-50 characters"))]
    pub matric: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    /// Account role
    pub role: UserRole,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub matric: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address or matric
    #[validate(length(min = 1, message = "Identifier must not be empty"))]
    pub identifier: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque session token; present it as `Authorization: Bearer ...`
    pub session_token: String,

    pub matric: String,
    pub username: String,
    pub role: UserRole,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// The token from the reset link
    pub token: String,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new account
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email or matric already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(ApiError::from)?;

    let user = state
        .accounts
        .register(account::RegisterRequest {
            matric: req.matric,
            email: req.email,
            username: req.username,
            role: req.role,
            password: req.password,
        })
        .await?;

    Ok(Json(RegisterResponse {
        matric: user.matric,
        email: user.email,
        username: user.username,
        role: user.role,
    }))
}

/// Login by email or matric
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown identifier or wrong password, with one
///   uniform message for both
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(ApiError::from)?;

    let outcome = state.accounts.login(&req.identifier, &req.password).await?;

    Ok(Json(LoginResponse {
        session_token: outcome.session_token,
        matric: outcome.user.matric,
        username: outcome.user.username,
        role: outcome.user.role,
    }))
}

/// Request a password reset link
///
/// Always answers 200 with the same message; whether a link was
/// actually issued depends on the email belonging to an account.
/// Delivery is spawned so the response never waits on it.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate().map_err(ApiError::from)?;

    if let Some(reset) = state.accounts.request_password_reset(&req.email).await? {
        let notifier = state.notifier.clone();
        tokio::spawn(async move {
            notifier
                .send_reset_link(&reset.email, &reset.username, &reset.token)
                .await;
        });
    }

    Ok(Json(MessageResponse {
        message: "If an account exists for that email, a reset link has been sent.".to_string(),
    }))
}

/// Complete a password reset
///
/// Consumes the token, installs the new password, and revokes every
/// live session for the account.
///
/// # Errors
///
/// - `401 Unauthorized`: Token absent, used, expired, or tampered with
/// - `422 Unprocessable Entity`: New password too short
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate().map_err(ApiError::from)?;

    let changed = state
        .accounts
        .change_password(&req.token, &req.new_password)
        .await?;

    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        notifier
            .send_password_changed(&changed.email, &changed.username)
            .await;
    });

    Ok(Json(MessageResponse {
        message: "Password updated successfully.".to_string(),
    }))
}
