/// Store seam consumed by the verifier and the issuer.
///
/// The core never talks to a concrete database; it is handed a `UserStore`
/// at construction time. Two implementations ship with the crate: a Postgres
/// store and an in-memory store used as a test double.
///
/// Refresh tokens cross this seam as SHA-256 fingerprints (see
/// [`token_fingerprint`]); plaintext tokens are never persisted.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::user::{NewUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Store failures visible to the core.
#[derive(Debug)]
pub enum StoreError {
    /// Unique-constraint violation on insert, or a conditional token update
    /// whose remove target was no longer present.
    Conflict,
    /// Everything else: connectivity, query execution, pool exhaustion.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "conflicting update"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            StoreError::Conflict
        } else {
            StoreError::Unavailable(error_msg)
        }
    }
}

/// Persistent user-record store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user with an empty refresh-token set.
    /// Fails with `Conflict` if the email is already registered.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Conditionally update a user's refresh-token set by fingerprint.
    ///
    /// Removes `remove` (if given) and inserts `add` (if given) as one atomic
    /// operation. When `remove` is given but no longer a member of the set,
    /// the whole update fails with `Conflict` and `add` is not applied — this
    /// is the anti-replay guarantee: of any number of concurrent rotations
    /// presenting the same token, at most one can succeed. Updates touch
    /// single elements only, so concurrent rotations of *different* tokens
    /// for the same user cannot overwrite each other.
    async fn update_refresh_tokens(
        &self,
        user_id: Uuid,
        remove: Option<&str>,
        add: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// SHA-256 fingerprint of a refresh token, hex-encoded.
///
/// The store keeps fingerprints, not tokens, so a leaked user record cannot
/// be replayed.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let token = "some.refresh.token";
        assert_eq!(token_fingerprint(token), token_fingerprint(token));
    }

    #[test]
    fn test_fingerprint_is_not_the_token() {
        let token = "some.refresh.token";
        let fp = token_fingerprint(token);

        assert_ne!(fp, token);
        // SHA-256 hex
        assert_eq!(fp.len(), 64);
    }

    #[test]
    fn test_different_tokens_different_fingerprints() {
        assert_ne!(token_fingerprint("token-a"), token_fingerprint("token-b"));
    }
}
