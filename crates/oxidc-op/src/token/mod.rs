//! Token issuance interface.
//!
//! Minting access, ID, and refresh tokens (signing, claims assembly, key
//! management) is owned by the deployment's issuer. The exchange flow hands
//! over only after every authentication and grant check has passed, and
//! returns the issuer's response unchanged.

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::grant::AuthorizationGrant;
use crate::oauth::token::TokenResponse;
use crate::types::Client;

/// Issues tokens for a validated authorization-code exchange.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Mints the token response for a consumed, validated grant.
    ///
    /// The grant carries the subject, scope, nonce, and authentication
    /// context; the client carries lifetimes and registration data.
    ///
    /// # Errors
    ///
    /// Returns an error if token generation fails. No partial response is
    /// ever produced: the exchange either returns this issuer's response or
    /// an error.
    async fn issue(&self, grant: &AuthorizationGrant, client: &Client) -> AuthResult<TokenResponse>;
}
