//! HTTP server for SCDS.
//!
//! Exposes put, get, time travel, and history of keyed documents as a small
//! REST API over a shared [`scds_sdk::Scds`]. Missing objects and no-change
//! puts answer `204 No Content`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::ScdsServer;
