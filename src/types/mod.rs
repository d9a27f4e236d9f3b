//! Authorization Types
//!
//! Core type definitions shared by strategies, sessions and the client.

pub mod config;
pub mod principal;
pub mod token;
pub mod user;

pub use config::*;
pub use principal::*;
pub use token::*;
pub use user::*;
