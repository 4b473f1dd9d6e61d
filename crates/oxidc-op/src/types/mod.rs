//! Domain types shared across the provider core.

pub mod client;

pub use client::{Client, ClientValidationError, GrantType, TokenEndpointAuthMethod};
