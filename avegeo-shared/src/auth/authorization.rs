/// Resource ownership checks
///
/// A stateless gate used before mutating or reading back a resource on
/// behalf of a caller: deactivating a geofence and listing its
/// attendances are creator-only operations.
///
/// An ownership failure is an `Authorization` error, never `NotFound` —
/// the resource exists, the caller lacks rights — and the two kinds map
/// to different HTTP statuses at the boundary.

use crate::error::{CoreError, CoreResult};

/// True iff the requester created the resource
pub fn is_owner(resource_creator_matric: &str, requester_matric: &str) -> bool {
    resource_creator_matric == requester_matric
}

/// Requires that the requester created the resource
///
/// # Errors
///
/// Returns `CoreError::Authorization` carrying `denied_message` when
/// the requester is not the creator.
pub fn require_creator(
    resource_creator_matric: &str,
    requester_matric: &str,
    denied_message: &str,
) -> CoreResult<()> {
    if !is_owner(resource_creator_matric, requester_matric) {
        return Err(CoreError::Authorization(denied_message.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_passes() {
        assert!(is_owner("ADM/001", "ADM/001"));
        assert!(require_creator("ADM/001", "ADM/001", "denied").is_ok());
    }

    #[test]
    fn test_non_creator_is_authorization_error() {
        let result = require_creator("ADM/001", "ADM/002", "You are not the creator.");
        match result {
            Err(CoreError::Authorization(msg)) => {
                assert_eq!(msg, "You are not the creator.");
            }
            other => panic!("expected Authorization error, got {:?}", other),
        }
    }
}
