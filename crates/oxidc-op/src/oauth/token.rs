//! Token endpoint wire types.
//!
//! Request parsing, response generation, and the RFC 6749 error vocabulary
//! for the token endpoint. Only the `authorization_code` grant is handled by
//! this provider core; the error vocabulary still covers the full protocol
//! set so that rejections of other grant types serialize correctly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AuthResult;
use crate::error::AuthError;

/// The only grant type this core exchanges.
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";

/// Access token request parameters.
///
/// Decoded from the `application/x-www-form-urlencoded` request body.
/// Client authentication evidence arrives either in the body
/// (`client_id`/`client_secret`, or `client_assertion_type`/`client_assertion`)
/// or via the HTTP Basic Auth header, which the transport layer merges into
/// `client_id`/`client_secret` before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenRequest {
    /// OAuth 2.0 grant type. Must be `authorization_code`.
    pub grant_type: String,

    /// The authorization code being exchanged.
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI; must match the URI bound to the grant at issuance.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (public clients).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Client ID (public clients and secret-based authentication).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (`client_secret_post`, or merged from Basic Auth).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Client assertion type URN (`private_key_jwt`).
    #[serde(default)]
    pub client_assertion_type: Option<String>,

    /// Client assertion JWT (`private_key_jwt`).
    #[serde(default)]
    pub client_assertion: Option<String>,
}

impl AccessTokenRequest {
    /// Validates the structural requirements of the request.
    ///
    /// Runs before any storage access: a request that fails here never
    /// touches a backend.
    ///
    /// # Errors
    ///
    /// - `UnsupportedGrantType` if `grant_type` is not `authorization_code`
    /// - `InvalidRequest` if `code` is missing or empty
    pub fn validate(&self) -> AuthResult<()> {
        if self.grant_type != GRANT_TYPE_AUTHORIZATION_CODE {
            return Err(AuthError::unsupported_grant_type(&self.grant_type));
        }
        if self.code.as_deref().unwrap_or_default().is_empty() {
            return Err(AuthError::invalid_request("code missing"));
        }
        Ok(())
    }

    /// Returns the authorization code.
    ///
    /// Only meaningful after [`validate`](Self::validate) has passed.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    /// Returns the redirect URI, defaulting to the empty string when absent
    /// so the grant validator's exact comparison still applies.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_deref().unwrap_or_default()
    }
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "scope": "openid profile",
///   "id_token": "eyJhbG..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Refresh token, when the client was granted one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token, when the `openid` scope was granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with the required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
            id_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: String) -> Self {
        self.id_token = Some(token);
        self
    }
}

/// Token error response.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "invalid code"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error without description.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }
}

impl From<&AuthError> for TokenError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidRequest { message } => {
                Self::with_description(TokenErrorCode::InvalidRequest, message)
            }
            AuthError::InvalidClient { message } => {
                Self::with_description(TokenErrorCode::InvalidClient, message)
            }
            AuthError::InvalidGrant { message } => {
                Self::with_description(TokenErrorCode::InvalidGrant, message)
            }
            AuthError::UnauthorizedClient { message } => {
                Self::with_description(TokenErrorCode::UnauthorizedClient, message)
            }
            AuthError::UnsupportedGrantType { grant_type } => Self::with_description(
                TokenErrorCode::UnsupportedGrantType,
                format!("grant type '{grant_type}' is not supported"),
            ),
            // Never surface internal causes on the wire.
            AuthError::Storage { .. }
            | AuthError::Configuration { .. }
            | AuthError::Internal { .. } => Self::new(TokenErrorCode::ServerError),
        }
    }
}

/// OAuth 2.0 token error codes.
///
/// Defined in RFC 6749 Section 5.2, plus `server_error` for masked internal
/// failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The authorization grant is invalid, expired, revoked, or was issued
    /// to another client.
    InvalidGrant,

    /// The authenticated client is not authorized to use this grant type.
    UnauthorizedClient,

    /// The grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,

    /// The server encountered an internal failure; details are logged, not
    /// returned.
    ServerError,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::ServerError => 500,
            Self::InvalidRequest
            | Self::InvalidGrant
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::InvalidScope => 400,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
