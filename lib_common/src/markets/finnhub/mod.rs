//! # Finnhub API Integration Module
//!
//! Read-only connector for the Finnhub market-data API. Every REST response
//! is decoded into a fixed-schema struct at the boundary and then reshaped
//! into a [`table::Table`] with human readable labels.
//!
//! ## Contained Modules:
//!
//! - **`apicall`**: retry-free HTTP client with the `token` query parameter
//!   and schema validation of each body.
//! - **`candles`**: `Resolution`, `CandleRange` and the date/time to unix helpers.
//! - **`connector`**: the `FinnhubConnector` operations.
//! - **`error`**: `FinnhubError`, the single error kind of the connector.
//! - **`models`**: serde mirrors of the endpoint payloads.
//! - **`streaming`**: the cancellable WebSocket relay.
//! - **`table`**: the immutable table model.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Low-level Finnhub REST client.
pub mod apicall;
/// Candle resolution and time range parameters.
pub mod candles;
/// High-level fetch operations returning tables.
pub mod connector;
/// Connector error type.
pub mod error;
/// Fixed-schema response models.
pub mod models;
/// WebSocket trade stream relay.
pub mod streaming;
/// Immutable labelled tables.
pub mod table;

pub use candles::{CandleRange, Resolution};
pub use connector::{BasicFinancials, FinnhubConnector, CRYPTO_EXCHANGES};
pub use error::{FinnhubError, FinnhubResult};
pub use streaming::FinnhubStream;
pub use table::{Cell, Table};
