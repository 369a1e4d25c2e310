/// Credential Verifier
///
/// Registration and email/password verification against the injected store.
/// `verify` is read-only; it never logs or returns the plaintext password or
/// the stored hash.

use std::sync::Arc;

use crate::configuration::PasswordSettings;
use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::store::UserStore;
use crate::user::{NewUser, User};

#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    cost: u32,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn UserStore>, settings: &PasswordSettings) -> Self {
        Self {
            store,
            cost: settings.effective_cost(),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `Conflict` if the email is already registered
    /// - `Internal` if hashing or the store fails
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(password, self.cost)?;

        // The pre-check above can race with a concurrent registration; the
        // store's unique email constraint turns the loser into `Conflict`.
        let user = self
            .store
            .insert(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Verify email/password and return the matching user.
    ///
    /// # Errors
    /// - `NotFound` if the email is unknown
    /// - `Unauthorized` on password mismatch
    /// - `Internal` if the store or hash comparison fails
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        Ok(user)
    }
}
