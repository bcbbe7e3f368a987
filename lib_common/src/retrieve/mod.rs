//! # Data Retrieval Module
//!
//! This module provides a centralized location for generic data retrieval
//! clients and utilities, primarily focused on HTTP-based interactions.
//!
//! ## Purpose:
//! The goal of the `retrieve` module is to offer a consistent way to fetch
//! data from external services, encapsulating common concerns such as URL
//! joining, query encoding and credentials. This keeps networking logic out
//! of the individual API clients.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP `ApiClient` built on `reqwest` and
//!   `reqwest-middleware`. It is the foundation of the Finnhub REST client.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client.
pub mod ky_http;

pub use ky_http::{ApiClient, ApiResponse, QueryToken};
