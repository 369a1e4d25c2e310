/// Error taxonomy for the credential core.
///
/// A deliberately closed set of externally-visible kinds. Refresh-token
/// failures of every flavor (malformed, expired, bad signature, unknown
/// subject, replay, persistence conflict) collapse into `InvalidToken` so
/// callers cannot be used as an oracle for which check failed. The specific
/// cause is logged internally, never attached to the value.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub enum AuthError {
    /// Email unknown at login.
    NotFound,
    /// Email already registered.
    Conflict,
    /// Password mismatch.
    Unauthorized,
    /// Any refresh-token failure. Carries no detail on purpose.
    InvalidToken,
    /// Configuration or store breakage outside the auth outcomes.
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotFound => write!(f, "user not found"),
            AuthError::Conflict => write!(f, "email already registered"),
            AuthError::Unauthorized => write!(f, "invalid credentials"),
            AuthError::InvalidToken => write!(f, "invalid refresh token"),
            AuthError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AuthError {}

impl From<crate::store::StoreError> for AuthError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::Conflict => AuthError::Conflict,
            crate::store::StoreError::Unavailable(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_display_carries_no_diagnostic_detail() {
        assert_eq!(AuthError::Unauthorized.to_string(), "invalid credentials");
        assert_eq!(AuthError::InvalidToken.to_string(), "invalid refresh token");
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: AuthError = StoreError::Conflict.into();
        match err {
            AuthError::Conflict => (),
            _ => panic!("Expected Conflict"),
        }
    }

    #[test]
    fn test_store_unavailable_maps_to_internal() {
        let err: AuthError = StoreError::Unavailable("pool exhausted".to_string()).into();
        match err {
            AuthError::Internal(_) => (),
            _ => panic!("Expected Internal"),
        }
    }
}
