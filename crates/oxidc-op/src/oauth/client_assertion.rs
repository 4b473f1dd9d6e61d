//! JWT client assertions (`private_key_jwt`).
//!
//! Confidential clients can authenticate with a JWT signed by their private
//! key instead of a shared secret (RFC 7523). Signature and claims
//! validation (issuer/subject binding, audience, expiry, one-time `jti`)
//! is a cryptographic concern owned by the deployment's verifier; the
//! exchange flow only dispatches to it and consumes the authenticated
//! [`Client`] it returns.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Assertion type URN identifying the JWT-bearer client assertion profile.
///
/// A token request carrying this value in `client_assertion_type` selects
/// `private_key_jwt` authentication, regardless of any other credentials in
/// the request.
pub const CLIENT_ASSERTION_TYPE_JWT_BEARER: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Verifier for JWT client assertions.
///
/// Implementations resolve the signing key from the client's registered
/// JWKS (inline or via `jwks_uri`), validate the signature and claims, and
/// return the client the assertion authenticates.
#[async_trait]
pub trait ClientAssertionVerifier: Send + Sync {
    /// Verifies a client assertion and returns the authenticated client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the assertion cannot be parsed, the client
    /// is unknown, the signature does not verify, or the claims are invalid
    /// (including `jti` replay).
    async fn verify(&self, assertion: &str) -> AuthResult<Client>;
}
