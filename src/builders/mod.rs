//! Builders
//!
//! Fluent builder patterns for client configuration and clients.

pub mod client;
pub mod config;

pub use client::AuthorizationClientBuilder;
pub use config::{client_config, ClientConfigBuilder};
