/// User record as the store persists it.
///
/// `refresh_tokens` holds SHA-256 fingerprints of the user's currently-valid
/// refresh tokens, never the tokens themselves. The set has at most one entry
/// per issued-and-not-yet-rotated token; membership is what makes a refresh
/// token "live".

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub refresh_tokens: HashSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Manual Debug so the password hash and token fingerprints never end up in
// log output.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("refresh_tokens", &self.refresh_tokens.len())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Insert shape: everything the caller provides; the store assigns id and
/// timestamps and starts with an empty token set.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "$2b$12$secret-hash".to_string(),
            refresh_tokens: HashSet::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("secret-hash"));
        assert!(rendered.contains("<redacted>"));
    }
}
