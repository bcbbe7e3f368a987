//! # Configuration Modules
//!
//! This module aggregates the configuration providers used by the connector
//! and the binaries built on it.

/// Explicit Finnhub endpoint and credential configuration.
pub mod config_finnhub;

pub use config_finnhub::{prompt_value, ConfigError, FinnhubConfig};
