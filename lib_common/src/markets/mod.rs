//! # Financial Market APIs Module
//!
//! This module groups together the client implementations for external
//! market data providers. Its purpose is to keep the details of talking to a
//! provider (URLs, credentials, payload shapes) away from the presentation
//! code, which only ever sees tables.
//!
//! ## Contained Modules:
//!
//! - **`finnhub`**: REST connector and WebSocket relay for the Finnhub API:
//!   symbol listings, company news, basic financials, earnings surprises,
//!   quotes and stock/crypto candles.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Client for the Finnhub REST and WebSocket APIs.
pub mod finnhub;
