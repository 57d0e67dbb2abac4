//! Configuration module for search execution
//!
//! This module provides the `SearchConfig` struct and its builder with
//! validation and defaults matching the search contract.

// Sub-modules
pub mod builder;
pub mod server;
pub mod types;

// Re-exports for public API
pub use builder::SearchConfigBuilder;
pub use server::ServerConfig;
pub use types::{CapPolicy, SearchConfig};
