//! Client storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage operations for OAuth 2.0 client registrations.
///
/// Secret verification is part of this trait so that backends own the hash
/// scheme and the comparison; the exchange flow never sees or compares raw
/// secret material.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Finds a client by its OAuth `client_id`.
    ///
    /// Returns `None` if no such client is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a client secret against the stored hash.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the secret matches
    /// - `Ok(false)` if it does not, or the client has no secret
    ///
    /// # Errors
    ///
    /// Returns an error if the client doesn't exist or the storage operation
    /// fails.
    ///
    /// # Security
    ///
    /// Implementations must use a constant-time comparison (or a password
    /// hash whose verify is) to avoid timing side channels.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
