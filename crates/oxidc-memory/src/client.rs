//! In-memory client storage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use oxidc_op::storage::ClientStorage;
use oxidc_op::types::Client;
use oxidc_op::{AuthError, AuthResult};

/// In-memory client registry.
///
/// Secrets are stored and compared in plain text; this backend exists for
/// development and tests, where the secret material is itself test data.
#[derive(Default)]
pub struct MemoryClientStorage {
    clients: RwLock<HashMap<String, ClientEntry>>,
}

struct ClientEntry {
    client: Client,
    secret: Option<String>,
}

impl MemoryClientStorage {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client, replacing any previous registration with the
    /// same `client_id`.
    pub fn insert(&self, client: Client, secret: Option<&str>) {
        self.clients.write().unwrap().insert(
            client.client_id.clone(),
            ClientEntry {
                client,
                secret: secret.map(str::to_string),
            },
        );
    }

    /// Removes a client registration.
    pub fn remove(&self, client_id: &str) {
        self.clients.write().unwrap().remove(client_id);
    }
}

#[async_trait]
impl ClientStorage for MemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .unwrap()
            .get(client_id)
            .map(|entry| entry.client.clone()))
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        let clients = self.clients.read().unwrap();
        let entry = clients
            .get(client_id)
            .ok_or_else(|| AuthError::storage(format!("client not found: {client_id}")))?;
        Ok(entry.secret.as_deref() == Some(secret))
    }
}
