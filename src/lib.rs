//! Credential-issuance core.
//!
//! Authenticates users by email/password, mints signed access/refresh token
//! pairs, and rotates refresh tokens against a persistent user store. HTTP
//! shaping, request validation, and password-reset flows live outside this
//! crate; it only exposes the verifier, the issuer, and the store seam.

pub mod claims;
pub mod configuration;
pub mod error;
pub mod password;
pub mod store;
pub mod telemetry;
pub mod token;
pub mod user;
pub mod verifier;

pub use claims::Claims;
pub use error::AuthError;
pub use token::{TokenIssuer, TokenPair};
pub use user::User;
pub use verifier::CredentialVerifier;
