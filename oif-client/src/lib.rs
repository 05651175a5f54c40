//! # oif-client
//!
//! Async client library for the Sigur OIF integration interface.
//!
//! This crate provides:
//! - TCP transport with bounded, timeout-limited line reads
//! - Session lifecycle (connect, login, query, quit)
//! - High-level API for objects, zones, access points and access decisions
//! - Configuration from YAML files and environment variables

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;

pub use client::Client;
pub use config::{ConfigError, ConnectionConfig};
pub use error::{ClientError, Result};
pub use session::{Session, SessionState};
pub use transport::Transport;
