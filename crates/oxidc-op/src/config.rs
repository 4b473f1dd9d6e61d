//! Exchange endpoint configuration.

use serde::{Deserialize, Serialize};

/// Deployment capabilities of the token endpoint.
///
/// Client authentication methods beyond Basic Auth and public-client PKCE
/// are opt-in per deployment. A client registered for a method the
/// deployment does not advertise is rejected with `invalid_client` before
/// any credential is examined.
///
/// # Example (TOML)
///
/// ```toml
/// [token_endpoint]
/// auth_method_post_supported = true
/// auth_method_private_key_jwt_supported = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Whether `client_secret_post` (secret in the request body) is
    /// accepted.
    pub auth_method_post_supported: bool,

    /// Whether `private_key_jwt` (JWT client assertions) is accepted.
    /// Requires an assertion verifier to be configured on the exchange
    /// service.
    pub auth_method_private_key_jwt_supported: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            auth_method_post_supported: true,
            auth_method_private_key_jwt_supported: false,
        }
    }
}

impl ExchangeConfig {
    /// Sets whether `client_secret_post` is accepted.
    #[must_use]
    pub fn with_auth_method_post(mut self, supported: bool) -> Self {
        self.auth_method_post_supported = supported;
        self
    }

    /// Sets whether `private_key_jwt` is accepted.
    #[must_use]
    pub fn with_auth_method_private_key_jwt(mut self, supported: bool) -> Self {
        self.auth_method_private_key_jwt_supported = supported;
        self
    }
}
