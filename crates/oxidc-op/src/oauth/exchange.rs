//! Authorization-code exchange service.
//!
//! Sequences the exchange as a straight line with no way back:
//! request validation → client authentication (which consumes the grant) →
//! grant validation → token issuance. The first failing step determines the
//! reported error and nothing after it runs; no partial token is ever
//! issued.

use std::sync::Arc;

use tracing::debug;

use crate::AuthResult;
use crate::config::ExchangeConfig;
use crate::error::AuthError;
use crate::oauth::client_assertion::ClientAssertionVerifier;
use crate::oauth::client_auth::ClientAuthenticator;
use crate::oauth::grant::AuthorizationGrant;
use crate::oauth::token::{AccessTokenRequest, TokenResponse};
use crate::storage::{ClientStorage, GrantStorage};
use crate::token::TokenIssuer;
use crate::types::{Client, GrantType};

/// The token endpoint's authorization-code exchange flow.
///
/// # Usage
///
/// ```ignore
/// let service = CodeExchangeService::new(
///     client_storage,
///     grant_storage,
///     token_issuer,
///     ExchangeConfig::default(),
/// );
///
/// let response = service.exchange(&request).await?;
/// ```
pub struct CodeExchangeService {
    /// Client authentication and grant retrieval.
    authenticator: ClientAuthenticator,

    /// External issuer invoked once every check has passed.
    token_issuer: Arc<dyn TokenIssuer>,
}

impl CodeExchangeService {
    /// Creates a new exchange service.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        grant_storage: Arc<dyn GrantStorage>,
        token_issuer: Arc<dyn TokenIssuer>,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            authenticator: ClientAuthenticator::new(client_storage, grant_storage, config),
            token_issuer,
        }
    }

    /// Configures the assertion verifier required for `private_key_jwt`
    /// support.
    #[must_use]
    pub fn with_assertion_verifier(mut self, verifier: Arc<dyn ClientAssertionVerifier>) -> Self {
        self.authenticator = self.authenticator.with_assertion_verifier(verifier);
        self
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// - `UnsupportedGrantType` / `InvalidRequest` for structural failures
    ///   (checked before any storage access)
    /// - `InvalidClient` when client authentication fails
    /// - `InvalidGrant` for bad codes, PKCE mismatches, client/grant
    ///   mismatches, and redirect URI mismatches
    /// - `UnauthorizedClient` when the client is not registered for the
    ///   authorization_code grant
    /// - whatever the token issuer reports, unchanged
    pub async fn exchange(&self, request: &AccessTokenRequest) -> AuthResult<TokenResponse> {
        request.validate()?;

        let (grant, client) = self.authenticator.authenticate(request).await?;
        validate_code_grant(&grant, &client, request)?;

        debug!(
            client_id = %client.client_id,
            "code grant validated, delegating to token issuer"
        );
        self.token_issuer.issue(&grant, &client).await
    }
}

/// Cross-checks the consumed grant against the authenticated client and the
/// token request.
///
/// The checks are ordered and short-circuiting; the first failure is the
/// reported error:
///
/// 1. the grant was issued to the authenticated client
/// 2. the client is registered for the authorization_code grant
/// 3. the request's redirect URI equals the grant's, byte for byte
///
/// # Errors
///
/// `InvalidGrant` for 1 and 3, `UnauthorizedClient` for 2.
pub fn validate_code_grant(
    grant: &AuthorizationGrant,
    client: &Client,
    request: &AccessTokenRequest,
) -> AuthResult<()> {
    if client.client_id != grant.client_id {
        return Err(AuthError::invalid_grant(
            "authorization code was issued to another client",
        ));
    }
    if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
        return Err(AuthError::unauthorized_client(
            "client missing grant type authorization_code",
        ));
    }
    if request.redirect_uri() != grant.redirect_uri {
        return Err(AuthError::invalid_grant("redirect_uri does not correspond"));
    }
    Ok(())
}
