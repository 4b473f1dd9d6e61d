//! OAuth 2.0 client registration types.
//!
//! A [`Client`] is registered out of band (dynamic registration, admin API,
//! or static configuration) and looked up by the token endpoint on every
//! exchange. Exactly one token-endpoint authentication method is configured
//! per client at registration time; the exchange flow rejects any request
//! that presents credentials for a different method.

use jsonwebtoken::jwk::JwkSet;
use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types a client can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (with PKCE for public clients).
    AuthorizationCode,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Token Endpoint Auth Method
// =============================================================================

/// Token endpoint client authentication methods.
///
/// Defined in OpenID Connect Core Section 9. Each client is registered with
/// exactly one method; presenting evidence for a different method is an
/// authentication failure, not a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// No client authentication (public clients, PKCE-protected).
    None,

    /// Client secret via HTTP Basic Auth.
    ClientSecretBasic,

    /// Client secret in the request body.
    ClientSecretPost,

    /// JWT client assertion signed with the client's private key.
    PrivateKeyJwt,
}

impl TokenEndpointAuthMethod {
    /// Returns the registered string form of the auth method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
            Self::PrivateKeyJwt => "private_key_jwt",
        }
    }

    /// Returns `true` for the shared-secret methods.
    #[must_use]
    pub fn uses_client_secret(&self) -> bool {
        matches!(self, Self::ClientSecretBasic | Self::ClientSecretPost)
    }
}

impl std::fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// A registered OAuth 2.0 / OIDC client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Hashed client secret (secret-based methods only). Verification goes
    /// through `ClientStorage::verify_secret`; this field is never compared
    /// directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Human-readable display name.
    pub name: String,

    /// The single token-endpoint authentication method this client is
    /// registered for.
    pub auth_method: TokenEndpointAuthMethod,

    /// Grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// Allowed redirect URIs for the authorization code flow.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Whether this client is currently active.
    pub active: bool,

    /// Access token lifetime in seconds, if overriding the deployment
    /// default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Inline JWKS holding the public keys of a `private_key_jwt` client.
    /// Consumed by the assertion verifier, not by this crate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<JwkSet>,

    /// JWKS URI for clients that rotate keys and publish them via URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
}

impl Client {
    /// Validates the registration invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is internally inconsistent.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        match self.auth_method {
            TokenEndpointAuthMethod::None => {
                if self.client_secret.is_some() {
                    return Err(ClientValidationError::SecretOnPublicClient);
                }
                if self.grant_types.contains(&GrantType::ClientCredentials) {
                    return Err(ClientValidationError::PublicClientCredentials);
                }
            }
            TokenEndpointAuthMethod::ClientSecretBasic | TokenEndpointAuthMethod::ClientSecretPost => {
                if self.client_secret.is_none() {
                    return Err(ClientValidationError::MissingSecret);
                }
            }
            TokenEndpointAuthMethod::PrivateKeyJwt => {
                if self.jwks.is_none() && self.jwks_uri.is_none() {
                    return Err(ClientValidationError::MissingJwks);
                }
            }
        }

        if self.grant_types.contains(&GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        Ok(())
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Checks if the given redirect URI is registered for this client.
    /// Comparison is exact, no normalization.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Returns the access token lifetime in seconds.
    ///
    /// Defaults to 3600 (1 hour) if not overridden.
    #[must_use]
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime.unwrap_or(3600)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client registration validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// Public clients cannot carry a client secret.
    #[error("Clients with auth method `none` cannot have a client secret")]
    SecretOnPublicClient,

    /// Public clients cannot use the client_credentials grant.
    #[error("Public clients cannot use the client_credentials grant")]
    PublicClientCredentials,

    /// Secret-based methods require a client secret.
    #[error("Secret-based auth methods require a client secret")]
    MissingSecret,

    /// private_key_jwt clients need a JWKS or a JWKS URI.
    #[error("private_key_jwt clients require a jwks or jwks_uri")]
    MissingJwks,

    /// Authorization code flow requires redirect URIs.
    #[error("Authorization code flow requires redirect URIs")]
    NoRedirectUris,
}

// =============================================================================
// Tests
// =============================================================================
