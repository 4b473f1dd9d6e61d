//! OAuth 2.0 token endpoint handler.
//!
//! HTTP handler for `POST /token` with an
//! `application/x-www-form-urlencoded` body. Only the `authorization_code`
//! grant is served; every other grant type is rejected with
//! `unsupported_grant_type`.
//!
//! # Example
//!
//! ```ignore
//! POST /token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//! &code_verifier=dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk
//! &client_id=my-app
//! ```
//!
//! # Logging
//!
//! Handlers log client ids, grant types, and error displays only. Codes,
//! verifiers, secrets, assertions, and issued tokens never reach the log.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error, info, warn};

use crate::error::AuthError;
use crate::oauth::exchange::CodeExchangeService;
use crate::oauth::token::{AccessTokenRequest, TokenError, TokenResponse};

/// State required for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    /// The authorization-code exchange flow.
    exchange: Arc<CodeExchangeService>,
}

impl TokenState {
    /// Creates a new token endpoint state.
    #[must_use]
    pub fn new(exchange: Arc<CodeExchangeService>) -> Self {
        Self { exchange }
    }
}

/// OAuth 2.0 token endpoint handler.
///
/// # Client Authentication
///
/// Clients authenticate using exactly one of:
/// - HTTP Basic Auth header (merged into the request body fields below)
/// - `client_id` + `client_secret` body parameters
/// - `client_assertion_type` + `client_assertion` (JWT-bearer)
/// - `client_id` only (public clients, PKCE-verified)
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    Form(mut request): Form<AccessTokenRequest>,
) -> Response {
    // Basic Auth credentials are an alternative transport for the same
    // client_id/client_secret pair; merge them before validation so the
    // exchange sees one uniform request shape.
    if let Some((client_id, client_secret)) = basic_auth_credentials(&headers) {
        request.client_id = Some(client_id);
        request.client_secret = Some(client_secret);
    }

    debug!(
        grant_type = %request.grant_type,
        client_id = ?request.client_id,
        "processing token request"
    );

    match state.exchange.exchange(&request).await {
        Ok(response) => {
            info!(
                client_id = ?request.client_id,
                grant_type = %request.grant_type,
                "token issued"
            );
            token_success_response(&response)
        }
        Err(err) => {
            warn!(
                client_id = ?request.client_id,
                grant_type = %request.grant_type,
                error = %err,
                "token request failed"
            );
            token_error_response(&err)
        }
    }
}

/// Extracts client credentials from an HTTP Basic Auth header.
///
/// Returns `None` for a missing or malformed header. The secret may contain
/// colons; only the first one separates id from secret.
#[must_use]
pub fn basic_auth_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let header = headers.get("authorization")?.to_str().ok()?;
    let encoded = header.trim().strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = credentials.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}

/// Builds a successful token response.
///
/// Token responses carry bearer material and must never be cached.
fn token_success_response(response: &TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}

/// Builds an error response for the token endpoint.
///
/// Client errors carry their description; server-side failures are logged
/// here and reported as a bare `server_error`.
fn token_error_response(err: &AuthError) -> Response {
    if err.is_server_error() {
        error!(error = %err, "internal failure during token request");
    }

    let token_error = TokenError::from(err);
    let status = StatusCode::from_u16(token_error.error.http_status())
        .unwrap_or(StatusCode::BAD_REQUEST);

    (
        status,
        [
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(token_error),
    )
        .into_response()
}
