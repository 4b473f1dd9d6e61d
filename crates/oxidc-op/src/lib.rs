//! # oxidc-op
//!
//! OpenID Provider core for the OAuth 2.0 token endpoint: the
//! authorization-code grant exchange.
//!
//! This crate provides:
//! - Token endpoint wire types (requests, responses, RFC 6749 error codes)
//! - Client authentication (`none` + PKCE, `client_secret_basic`,
//!   `client_secret_post`, `private_key_jwt`)
//! - Grant validation (client binding, grant-type entitlement, exact
//!   redirect URI matching)
//! - Storage traits with atomic one-time code consumption
//! - An axum handler wiring the flow to HTTP
//!
//! ## Overview
//!
//! The exchange is a single forward pass: normalize the request,
//! authenticate the client (which consumes the grant addressed by the
//! code), cross-check grant against client and request, then delegate to
//! the deployment's [`TokenIssuer`](token::TokenIssuer). Any failure is
//! terminal and maps to exactly one OAuth 2.0 error code.
//!
//! All cross-request state lives behind the [`storage`] traits; the core
//! itself holds no mutable state and processes each request independently.
//!
//! ## Modules
//!
//! - [`config`] - Deployment capability flags
//! - [`error`] - The error taxonomy and its wire mapping
//! - [`oauth`] - Exchange flow, client authentication, PKCE, wire types
//! - [`storage`] - Client and grant persistence traits
//! - [`token`] - Token issuance trait
//! - [`http`] - Axum HTTP handlers

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use config::ExchangeConfig;
pub use error::AuthError;
pub use http::{TokenState, token_handler};
pub use oauth::{
    AccessTokenRequest, AuthorizationGrant, CLIENT_ASSERTION_TYPE_JWT_BEARER, ClientAssertionVerifier,
    ClientAuthenticator, CodeExchangeService, GRANT_TYPE_AUTHORIZATION_CODE, PkceChallenge,
    PkceChallengeMethod, PkceError, PkceVerifier, TokenError, TokenErrorCode, TokenResponse,
    validate_code_grant,
};
pub use storage::{ClientStorage, GrantStorage};
pub use token::TokenIssuer;
pub use types::{Client, ClientValidationError, GrantType, TokenEndpointAuthMethod};

/// Type alias for results in the provider core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use oxidc_op::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::ExchangeConfig;
    pub use crate::error::AuthError;
    pub use crate::http::{TokenState, token_handler};
    pub use crate::oauth::{
        AccessTokenRequest, AuthorizationGrant, ClientAssertionVerifier, ClientAuthenticator,
        CodeExchangeService, PkceChallenge, PkceVerifier, TokenError, TokenErrorCode,
        TokenResponse,
    };
    pub use crate::storage::{ClientStorage, GrantStorage};
    pub use crate::token::TokenIssuer;
    pub use crate::types::{Client, GrantType, TokenEndpointAuthMethod};
}
