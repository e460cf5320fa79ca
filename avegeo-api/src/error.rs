/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>`; the conversion from the core error type
/// preserves the distinction between the business outcomes (not found,
/// conflict, denied position) and real failures, which surface as 500
/// with the detail logged rather than exposed.
///
/// # Status mapping
///
/// | Core error          | Status | error code          |
/// |---------------------|--------|---------------------|
/// | `NotFound`          | 404    | `not_found`         |
/// | `Conflict`          | 409    | `conflict`          |
/// | `Validation`        | 422    | `validation_error`  |
/// | `Authentication`    | 401    | `unauthorized`      |
/// | `Authorization`     | 403    | `forbidden`         |
/// | `GeometryRejection` | 403    | `outside_geofence`  |
/// | `Internal`          | 500    | `internal_error`    |

use avegeo_shared::error::CoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) — duplicate user, repeated attendance, name clash
    Conflict(String),

    /// Unprocessable entity (422) — request or domain validation
    Validation {
        message: String,
        details: Vec<ValidationErrorDetail>,
    },

    /// Forbidden (403) with a dedicated code — the submitted position
    /// is outside the geofence circle
    OutsideGeofence(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "outside_geofence")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Validation { message, .. } => write!(f, "Validation failed: {}", message),
            ApiError::OutsideGeofence(msg) => write!(f, "Outside geofence: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                if details.is_empty() {
                    None
                } else {
                    Some(details)
                },
            ),
            ApiError::OutsideGeofence(msg) => {
                (StatusCode::FORBIDDEN, "outside_geofence", msg, None)
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert core errors to API errors
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Conflict(msg) => ApiError::Conflict(msg),
            CoreError::Validation(msg) => ApiError::Validation {
                message: msg,
                details: Vec::new(),
            },
            CoreError::Authentication(msg) => ApiError::Unauthorized(msg),
            CoreError::Authorization(msg) => ApiError::Forbidden(msg),
            CoreError::GeometryRejection(msg) => ApiError::OutsideGeofence(msg),
            CoreError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert request-body validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation {
            message: "Request validation failed".to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("User not found.".to_string());
        assert_eq!(err.to_string(), "Not found: User not found.");

        let err = ApiError::OutsideGeofence("outside".to_string());
        assert_eq!(err.to_string(), "Outside geofence: outside");
    }

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CoreError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                CoreError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Authentication("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (CoreError::Authorization("x".into()), StatusCode::FORBIDDEN),
            (
                CoreError::GeometryRejection("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                CoreError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (core, expected) in cases {
            let response = ApiError::from(core).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_geometry_rejection_keeps_distinct_code() {
        // Both map to 403 but the body codes differ
        let authz: ApiError = CoreError::Authorization("denied".into()).into();
        let geo: ApiError = CoreError::GeometryRejection("outside".into()).into();

        assert!(matches!(authz, ApiError::Forbidden(_)));
        assert!(matches!(geo, ApiError::OutsideGeofence(_)));
    }
}
