//! OAuth 2.0 / OIDC token endpoint core.
//!
//! The authorization-code exchange is implemented across several
//! submodules:
//!
//! - [`token`] - Request/response wire types for the token endpoint
//! - [`grant`] - Stored authorization grant records
//! - [`client_auth`] - Client authentication strategies
//! - [`client_assertion`] - JWT-bearer client assertion interface
//! - [`pkce`] - PKCE challenge/verifier implementation
//! - [`exchange`] - The exchange service tying it all together
//!
//! # Example
//!
//! ```ignore
//! use oxidc_op::oauth::{CodeExchangeService, AccessTokenRequest};
//! use oxidc_op::config::ExchangeConfig;
//!
//! let service = CodeExchangeService::new(
//!     client_storage,
//!     grant_storage,
//!     token_issuer,
//!     ExchangeConfig::default(),
//! );
//! let response = service.exchange(&request).await?;
//! ```

pub mod client_assertion;
pub mod client_auth;
pub mod exchange;
pub mod grant;
pub mod pkce;
pub mod token;

// Client assertion interface (private_key_jwt)
pub use client_assertion::{CLIENT_ASSERTION_TYPE_JWT_BEARER, ClientAssertionVerifier};

// Client authentication
pub use client_auth::ClientAuthenticator;

// Exchange service
pub use exchange::{CodeExchangeService, validate_code_grant};

// Grant records
pub use grant::AuthorizationGrant;

// PKCE types
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier};

// Token endpoint wire types
pub use token::{
    AccessTokenRequest, GRANT_TYPE_AUTHORIZATION_CODE, TokenError, TokenErrorCode, TokenResponse,
};
