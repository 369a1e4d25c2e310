/// Signed-token payload.
///
/// Both access and refresh tokens carry the same shape: subject (email),
/// issued-at, expires-at. `jti` is a random token id so that two tokens
/// minted for the same subject within the same second are still distinct —
/// rotation must always produce a refresh token that differs from the one it
/// replaces.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Random token id
    pub jti: String,
}

impl Claims {
    pub fn new(subject: &str, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl_seconds,
            jti: new_token_id(),
        }
    }

    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}

fn new_token_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
