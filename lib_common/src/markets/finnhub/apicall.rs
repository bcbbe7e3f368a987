//! # Finnhub API Client
//!
//! Thin, retry-free client for the Finnhub REST API. It owns an `ApiClient`
//! configured with the base URL and the `token` query parameter, checks the
//! HTTP status and validates the body against the endpoint's schema.
//!
//! ## Core Features:
//! - **No Retries**: a failed call surfaces immediately.
//! - **Token Hygiene**: transport errors name the endpoint path, never the
//!   URL carrying the token.
//! - **Schema Validation**: bodies are decoded straight into the fixed
//!   structs of `models`; a mismatch is a `FinnhubError::Decode`.
//! - **Logging**: debug line per request, error lines for HTTP and schema
//!   failures.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use super::error::{FinnhubError, FinnhubResult};
use crate::configs::config_finnhub::FinnhubConfig;
use crate::retrieve::ky_http::{ApiClient, QueryToken};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Longest slice of a raw payload copied into a log line.
const LOG_PAYLOAD_LIMIT: usize = 512;

/// # Finnhub API Call Client
///
/// A specialized client for making requests to the Finnhub REST API.
pub struct ApiCallFinnhub {
    /// The underlying generic HTTP client, pre-configured for the Finnhub base URL.
    client: ApiClient,
}

impl ApiCallFinnhub {
    /// Initializes a new client from an explicit configuration.
    ///
    /// # Errors
    /// Fails when the API key is empty or the base URL is not absolute.
    pub fn new(config: &FinnhubConfig) -> FinnhubResult<Self> {
        config
            .validate()
            .map_err(|e| FinnhubError::InvalidInput(e.to_string()))?;
        let token = QueryToken {
            name: "token".to_string(),
            value: config.api_key.clone(),
        };
        let client = ApiClient::new(&config.base_api_url, Some(token))?;
        Ok(Self { client })
    }

    /// Fetches `path` with `query` and decodes the body into `T`.
    ///
    /// ## Logic:
    /// 1. GET through the `ApiClient` (token appended as a query parameter).
    /// 2. Non-2xx status yields `FinnhubError::Http` with the error body.
    /// 3. The JSON body is decoded into `T`; a mismatch yields `FinnhubError::Decode`.
    pub async fn fetch_finnhub<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FinnhubResult<T> {
        let response = self.client.get::<Value>(path, query).await?;

        if !response.success {
            let body = response.error_body.unwrap_or_default();
            log::error!("HTTP Request failed for {}: Status {}", path, response.status);
            return Err(FinnhubError::Http {
                path: path.to_string(),
                status: response.status,
                body,
            });
        }

        let raw = response.data.unwrap_or(Value::Null);
        serde_json::from_value::<T>(raw.clone()).map_err(|source| {
            let mut snippet = raw.to_string();
            if snippet.len() > LOG_PAYLOAD_LIMIT {
                let mut cut = LOG_PAYLOAD_LIMIT;
                while !snippet.is_char_boundary(cut) {
                    cut -= 1;
                }
                snippet.truncate(cut);
            }
            log::error!("Schema validation failed for {}: {} payload={}", path, source, snippet);
            FinnhubError::Decode {
                path: path.to_string(),
                source,
            }
        })
    }
}
