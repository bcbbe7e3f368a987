//! # Finnhub Errors
//!
//! The single error type surfaced by every connector operation. Each variant
//! carries a descriptive message; nothing is retried or recovered locally.

use thiserror::Error;

/// Errors returned by the Finnhub connector.
#[derive(Debug, Error)]
pub enum FinnhubError {
    /// The API answered, but there are no rows for the requested symbol/date combination.
    #[error("THERE IS NO DATA FOR-> {0}")]
    EmptyResult(String),

    /// A symbol search matched nothing.
    #[error("NOTHING FOUND FOR QUERY-> {0}")]
    Lookup(String),

    /// A crypto exchange code yields no symbols.
    #[error("{0} IS NOT A VALID EXCHANGE")]
    InvalidExchange(String),

    /// Non-2xx status from the API.
    #[error("HTTP request failed for {path}: status {status}: {body}")]
    Http {
        /// Endpoint path, without the token.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Raw error body, possibly empty.
        body: String,
    },

    /// The response body does not match the fixed schema of the endpoint.
    #[error("Unexpected payload from {path}: {source}")]
    Decode {
        /// Endpoint path.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Network or client construction failure. The message never contains the token.
    #[error("Transport error: {0:#}")]
    Transport(#[from] anyhow::Error),

    /// Caller supplied a malformed date, time or resolution.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// WebSocket connection failure.
    #[error("Stream error: {0}")]
    Stream(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Result alias used across the connector.
pub type FinnhubResult<T> = Result<T, FinnhubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        assert_eq!(
            FinnhubError::EmptyResult("AAPL FROM 2024-01-01 TO 2024-01-02".into()).to_string(),
            "THERE IS NO DATA FOR-> AAPL FROM 2024-01-01 TO 2024-01-02"
        );
        assert_eq!(FinnhubError::Lookup("zzzz".into()).to_string(), "NOTHING FOUND FOR QUERY-> zzzz");
        assert_eq!(FinnhubError::InvalidExchange("NOPE".into()).to_string(), "NOPE IS NOT A VALID EXCHANGE");
    }
}
