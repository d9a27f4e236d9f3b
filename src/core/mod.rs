//! Core Components
//!
//! HTTP transport and the endpoint binding used by strategies.

pub mod endpoint;
pub mod transport;

pub use endpoint::*;
pub use transport::*;
