//! In-memory grant storage.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use oxidc_op::oauth::AuthorizationGrant;
use oxidc_op::storage::GrantStorage;
use oxidc_op::{AuthError, AuthResult};

/// In-memory grant store keyed by authorization code.
///
/// The whole map sits behind one mutex, which makes
/// [`consume`](GrantStorage::consume) trivially atomic: the validity check
/// and the `consumed_at` stamp happen under a single lock acquisition, so
/// two concurrent exchanges of the same code can never both succeed.
#[derive(Default)]
pub struct MemoryGrantStorage {
    grants: Mutex<HashMap<String, AuthorizationGrant>>,
}

impl MemoryGrantStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored grants, consumed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.lock().unwrap().len()
    }

    /// Returns `true` if no grants are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl GrantStorage for MemoryGrantStorage {
    async fn create(&self, grant: &AuthorizationGrant) -> AuthResult<()> {
        let mut grants = self.grants.lock().unwrap();
        if grants.contains_key(&grant.code) {
            return Err(AuthError::storage("duplicate authorization code"));
        }
        grants.insert(grant.code.clone(), grant.clone());
        Ok(())
    }

    async fn consume(&self, code: &str) -> AuthResult<AuthorizationGrant> {
        let mut grants = self.grants.lock().unwrap();
        let grant = grants
            .get_mut(code)
            .ok_or_else(|| AuthError::invalid_grant("code not found"))?;

        if grant.is_consumed() {
            return Err(AuthError::invalid_grant("code already consumed"));
        }
        if grant.is_expired() {
            return Err(AuthError::invalid_grant("code expired"));
        }

        grant.consumed_at = Some(OffsetDateTime::now_utc());
        Ok(grant.clone())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut grants = self.grants.lock().unwrap();
        let before = grants.len();
        grants.retain(|_, grant| !grant.is_expired());
        Ok((before - grants.len()) as u64)
    }
}
