//! Authorization grant records.
//!
//! An [`AuthorizationGrant`] is created by the authorization endpoint when a
//! code is issued, persisted by a [`GrantStorage`](crate::storage::GrantStorage)
//! backend, and redeemed exactly once at the token endpoint.
//!
//! # Lifecycle
//!
//! 1. Grant created and stored when the authorization code is issued
//! 2. Client exchanges the code for tokens (grant consumed, atomically)
//! 3. Expired or consumed grants are cleaned up by the backend
//!
//! # Security
//!
//! - Authorization codes are cryptographically random (256 bits)
//! - Grants expire after a short time (10 minutes recommended)
//! - Codes are single-use: consumption happens at lookup time, so a failed
//!   exchange burns the code instead of leaving it replayable
//! - The PKCE challenge bound at issuance is stored for verification at
//!   exchange time

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored authorization grant, keyed by its code.
///
/// Carries everything the token endpoint needs to validate the exchange and
/// everything the issuer needs to mint tokens (subject, scope, nonce,
/// authentication context).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationGrant {
    /// Unique grant identifier.
    pub id: Uuid,

    /// Authorization code (one-time use). 256-bit random value,
    /// base64url-encoded.
    pub code: String,

    /// The client the grant was issued to.
    pub client_id: String,

    /// Redirect URI bound to the grant at issuance. The token request must
    /// present exactly this string.
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// PKCE code challenge bound at issuance. Present for public clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE challenge method (always "S256").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,

    /// The authenticated end-user the grant was issued for.
    pub subject: String,

    /// OpenID Connect nonce for ID token binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Authentication method references for the end-user login (e.g. "pwd").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amr: Vec<String>,

    /// When the end-user authenticated.
    #[serde(with = "time::serde::rfc3339")]
    pub auth_time: OffsetDateTime,

    /// When the grant was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the grant expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When the code was exchanged. `None` until consumed.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub consumed_at: Option<OffsetDateTime>,
}

impl AuthorizationGrant {
    /// Generates a new cryptographically secure authorization code.
    ///
    /// 32 bytes of CSPRNG output, base64url-encoded without padding
    /// (43 characters).
    #[must_use]
    pub fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the grant has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the authorization code has already been exchanged.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the grant is still redeemable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }
}
