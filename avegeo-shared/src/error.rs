/// Core error type shared by every service operation
///
/// Each variant is an expected business outcome with a user-actionable
/// message, except `Internal`, which wraps unexpected storage or signing
/// failures and must be shown to callers as an opaque message only.
///
/// The HTTP layer maps these kinds to status codes; the core never
/// signals expected outcomes through panics or generic errors.

/// Result alias used throughout the core services
pub type CoreResult<T> = Result<T, CoreError>;

/// Typed error kinds for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Referenced user, geofence, or token does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate geofence name+date, duplicate attendance, or a repeated
    /// state transition (e.g. deactivating an already-inactive geofence)
    #[error("{0}")]
    Conflict(String),

    /// Malformed business input: bad time window, out-of-range coordinates
    #[error("{0}")]
    Validation(String),

    /// Invalid, expired, or already-consumed credential
    #[error("{0}")]
    Authentication(String),

    /// Caller is not the creator of the resource (which does exist)
    #[error("{0}")]
    Authorization(String),

    /// Well-formed coordinates that fall outside the geofence radius
    #[error("{0}")]
    GeometryRejection(String),

    /// Unexpected storage or signing failure; logged with detail,
    /// surfaced opaquely
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Internal(format!("database error: {}", err))
    }
}

impl CoreError {
    /// True when the error is an expected business outcome rather than
    /// an operational failure
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, CoreError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_messages_pass_through() {
        let err = CoreError::Conflict("You have already recorded attendance for this class".into());
        assert_eq!(
            err.to_string(),
            "You have already recorded attendance for this class"
        );
    }

    #[test]
    fn test_internal_is_not_business_outcome() {
        assert!(!CoreError::Internal("boom".into()).is_business_outcome());
        assert!(CoreError::NotFound("no such geofence".into()).is_business_outcome());
        assert!(CoreError::GeometryRejection("not within geofence".into()).is_business_outcome());
    }

    #[test]
    fn test_sqlx_error_folds_to_internal() {
        let err: CoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
