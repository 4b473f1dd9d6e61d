//! Authorization grant storage trait.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Store grants with a short TTL (10 minutes max)
//! - Support efficient lookup by authorization code
//! - Make [`consume`](GrantStorage::consume) atomic: two concurrent
//!   consumes of the same code must never both succeed
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - Grants should be stored encrypted at rest if possible

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::grant::AuthorizationGrant;

/// Storage trait for authorization grants.
///
/// Grants are created when the authorization endpoint issues a code and
/// consumed, exactly once, when the token endpoint exchanges it.
#[async_trait]
pub trait GrantStorage: Send + Sync {
    /// Creates a new authorization grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant cannot be stored (e.g. duplicate code,
    /// backend unavailable).
    async fn create(&self, grant: &AuthorizationGrant) -> AuthResult<()>;

    /// Atomically fetches and invalidates the grant for an authorization
    /// code.
    ///
    /// This is the one-time-use point of the code exchange: the returned
    /// grant has its `consumed_at` stamped, and any later consume of the
    /// same code fails. Consumption happens at lookup time, before the rest
    /// of the exchange validates the grant, so a failed exchange burns the
    /// code rather than leaving it replayable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the code is unknown, already consumed, or
    /// expired; a storage error otherwise.
    ///
    /// # Atomicity
    ///
    /// Implementations must make the check-and-stamp a single atomic step.
    /// In SQL this is a conditional update:
    ///
    /// ```sql
    /// UPDATE auth_grants
    /// SET consumed_at = NOW()
    /// WHERE code = $1 AND consumed_at IS NULL AND expires_at > NOW()
    /// RETURNING *
    /// ```
    async fn consume(&self, code: &str) -> AuthResult<AuthorizationGrant>;

    /// Deletes expired grants.
    ///
    /// Should be called periodically by the backend's janitor.
    ///
    /// # Returns
    ///
    /// Returns the number of grants deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
