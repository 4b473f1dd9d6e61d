//! In-memory storage backend for oxidc-op.
//!
//! Provides non-persistent implementations of the storage traits:
//!
//! - OAuth client registrations ([`MemoryClientStorage`])
//! - Authorization grants ([`MemoryGrantStorage`])
//!
//! Intended for development and tests. Secrets are kept in plain text and
//! nothing survives a restart; production deployments use a persistent
//! backend.
//!
//! # Example
//!
//! ```ignore
//! use oxidc_memory::{MemoryClientStorage, MemoryGrantStorage};
//!
//! let clients = MemoryClientStorage::new();
//! clients.insert(client, Some("plaintext-secret"));
//!
//! let grants = MemoryGrantStorage::new();
//! grants.create(&grant).await?;
//! ```

pub mod client;
pub mod grant;

pub use client::MemoryClientStorage;
pub use grant::MemoryGrantStorage;
