//! Axum HTTP handlers for the provider endpoints.

pub mod token;

pub use token::{TokenState, token_handler};
