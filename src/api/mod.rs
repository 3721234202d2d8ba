//! Request/response transport against the game server.
//!
//! The server is the single source of truth for rules, AI, and
//! persistence; every operation here returns the server's word as a
//! full snapshot or a rejection reason, never a local derivation.
mod client;
mod config;
mod error;
mod requests;

pub use client::*;
pub use config::*;
pub use error::*;
pub use requests::*;
