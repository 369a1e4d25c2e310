/// Token Issuer & Rotator
///
/// Mints signed access/refresh token pairs and rotates refresh tokens
/// against the injected store. A refresh token moves through exactly one
/// path: issued, live while its fingerprint is a member of the owner's set,
/// then rotated (replaced by a successor), expired, or rejected. It never
/// becomes live again after leaving the set.
///
/// Every rotation failure — malformed, tampered, expired, unknown subject,
/// replay, store conflict or timeout — surfaces as `InvalidToken` with no
/// further detail. The specific cause is logged at `warn`.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::time::timeout;

use crate::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::AuthError;
use crate::store::{token_fingerprint, StoreError, UserStore};
use crate::user::User;

/// Bound on individual store operations during issuance and rotation.
const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Access/refresh pair as handed to the client. Immutable once issued.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<dyn UserStore>,
    settings: JwtSettings,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn UserStore>, settings: JwtSettings) -> Self {
        Self { store, settings }
    }

    /// Mint a token pair for a verified user. Pure construction: nothing is
    /// persisted, so the refresh token is not yet live. Use [`grant`] for the
    /// login path.
    ///
    /// The two tokens are signed with distinct secrets and carry independent
    /// TTLs.
    ///
    /// [`grant`]: TokenIssuer::grant
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access_token = sign(
            &user.email,
            self.settings.access_token_expiry,
            &self.settings.access_secret,
        )?;
        let refresh_token = sign(
            &user.email,
            self.settings.refresh_token_expiry,
            &self.settings.refresh_secret,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mint a token pair and persist the refresh token's fingerprint into
    /// the user's live set.
    ///
    /// # Errors
    /// `Internal` if the store rejects the update or times out.
    pub async fn grant(&self, user: &User) -> Result<TokenPair, AuthError> {
        let pair = self.issue_pair(user)?;
        let fingerprint = token_fingerprint(&pair.refresh_token);

        match timeout(
            STORE_TIMEOUT,
            self.store.update_refresh_tokens(user.id, None, Some(&fingerprint)),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AuthError::Internal(
                    "store timeout while persisting refresh token".to_string(),
                ))
            }
        }

        tracing::info!(user_id = %user.id, "token pair issued");
        Ok(pair)
    }

    /// Exchange a live refresh token for a fresh pair.
    ///
    /// Verifies signature and expiry against the refresh secret, resolves
    /// the subject, then atomically replaces the presented token's
    /// fingerprint with the successor's in one conditional store update.
    /// The remove-if-present semantics of that update are what reject
    /// replays: of N concurrent calls presenting the same token, at most
    /// one succeeds.
    ///
    /// Fail-closed: a store conflict, failure, or timeout after the token
    /// was accepted rejects the rotation and the client must log in again.
    ///
    /// # Errors
    /// `InvalidToken`, for every failure mode.
    pub async fn rotate(&self, presented: &str) -> Result<TokenPair, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(
            presented,
            &DecodingKey::from_secret(self.settings.refresh_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("refresh token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        let user = match timeout(STORE_TIMEOUT, self.store.find_by_email(&claims.sub)).await {
            Ok(Ok(Some(user))) => user,
            Ok(Ok(None)) => {
                tracing::warn!("refresh token subject unknown");
                return Err(AuthError::InvalidToken);
            }
            Ok(Err(e)) => {
                tracing::warn!("store lookup failed during rotation: {}", e);
                return Err(AuthError::InvalidToken);
            }
            Err(_) => {
                tracing::warn!("store lookup timed out during rotation");
                return Err(AuthError::InvalidToken);
            }
        };

        let presented_fingerprint = token_fingerprint(presented);
        if !user.refresh_tokens.contains(&presented_fingerprint) {
            tracing::warn!(user_id = %user.id, "refresh token replay rejected");
            return Err(AuthError::InvalidToken);
        }

        let pair = self.issue_pair(&user).map_err(|e| {
            tracing::warn!(user_id = %user.id, "token minting failed during rotation: {}", e);
            AuthError::InvalidToken
        })?;
        let successor_fingerprint = token_fingerprint(&pair.refresh_token);

        match timeout(
            STORE_TIMEOUT,
            self.store.update_refresh_tokens(
                user.id,
                Some(&presented_fingerprint),
                Some(&successor_fingerprint),
            ),
        )
        .await
        {
            Ok(Ok(())) => {
                tracing::info!(user_id = %user.id, "refresh token rotated");
                Ok(pair)
            }
            Ok(Err(StoreError::Conflict)) => {
                tracing::warn!(user_id = %user.id, "rotation lost a race for this token");
                Err(AuthError::InvalidToken)
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id = %user.id, "store update failed during rotation: {}", e);
                Err(AuthError::InvalidToken)
            }
            Err(_) => {
                tracing::warn!(user_id = %user.id, "store update timed out during rotation");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Unauthenticated payload extraction for display and audit.
    ///
    /// Skips signature and expiry checks entirely; fails only if the token
    /// is not three parseable segments. Must never feed an authorization
    /// decision.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("undecodable token: {}", e);
                AuthError::InvalidToken
            })
    }
}

fn sign(subject: &str, ttl_seconds: i64, secret: &str) -> Result<String, AuthError> {
    let claims = Claims::new(subject, ttl_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("token generation failed: {}", e)))
}
