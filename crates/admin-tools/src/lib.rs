//! Kong Admin API client + resource tool implementations.
//!
//! This crate is intended to be used by `kong-mcp-server` to back its MCP tool
//! surface. It intentionally contains **no** MCP protocol logic and **no**
//! transport state: everything here is an authenticated HTTP call against the
//! downstream admin API plus payload assembly for the supported resources.

pub mod client;
pub mod config;
pub mod error;
pub mod plugins;
pub mod rate_limiting;
pub mod routes;
pub mod services;
pub mod status;

pub use client::AdminClient;
pub use config::{AdminAuth, AdminConfig};
pub use error::{AdminError, Result};
