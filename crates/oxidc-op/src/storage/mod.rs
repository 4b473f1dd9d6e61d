//! Storage traits for provider data.
//!
//! This module defines the persistence interfaces the exchange flow depends
//! on:
//!
//! - OAuth client registrations
//! - Authorization grants (codes)
//!
//! # Implementations
//!
//! Storage implementations live in separate crates; `oxidc-memory` provides
//! an in-memory backend for development and tests.

pub mod client;
pub mod grant;

pub use client::ClientStorage;
pub use grant::GrantStorage;
