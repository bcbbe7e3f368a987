//! # Finnhub Configuration Module
//!
//! Holds the explicit configuration object handed to the Finnhub connector.
//! There is no global state: whoever runs the process builds a
//! `FinnhubConfig` (from defaults, a JSON file and CLI/env values) and passes
//! it into `FinnhubConnector::new`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default REST base URL. Relative endpoint paths are joined onto it.
pub const DEFAULT_BASE_API_URL: &str = "https://finnhub.io/api/v1/";
/// Default WebSocket endpoint for trade streaming.
pub const DEFAULT_WS_URL: &str = "wss://ws.finnhub.io";

/// Errors raised while assembling a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this schema.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// No API key was supplied by any source.
    #[error("Finnhub API key is missing")]
    MissingApiKey,
}

/// Connection settings for the Finnhub REST and WebSocket APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinnhubConfig {
    /// API token, sent as the `token` query parameter.
    pub api_key: String,
    /// REST base URL, must end with a slash.
    pub base_api_url: String,
    /// WebSocket URL, without the token.
    pub ws_url: String,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_api_url: DEFAULT_BASE_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
        }
    }
}

impl FinnhubConfig {
    /// Default endpoints with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Builder-style override of both endpoints, mostly for pointing at a mock server.
    pub fn with_endpoints(mut self, base_api_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        self.base_api_url = ensure_trailing_slash(base_api_url.into());
        self.ws_url = ws_url.into();
        self
    }

    /// Loads a (possibly partial) config from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg: FinnhubConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.base_api_url = ensure_trailing_slash(cfg.base_api_url);
        Ok(cfg)
    }

    /// Merges two configs, where non-empty values of `other` override `self`.
    pub fn merge(self, other: FinnhubConfig) -> FinnhubConfig {
        fn pick(base: String, over: String) -> String {
            if over.trim().is_empty() { base } else { over }
        }
        FinnhubConfig {
            api_key: pick(self.api_key, other.api_key),
            base_api_url: ensure_trailing_slash(pick(self.base_api_url, other.base_api_url)),
            ws_url: pick(self.ws_url, other.ws_url),
        }
    }

    /// Checks that the config is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    /// Full WebSocket URL including the token.
    pub fn ws_url_with_token(&self) -> String {
        let sep = if self.ws_url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.ws_url, sep, self.api_key)
    }
}

/// Writes `message` to `output` and reads one trimmed line from `input`.
///
/// Used for runtime values (API key, symbol) that no other source supplied.
pub fn prompt_value<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<String> {
    output.write_all(message.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no input for prompt"));
    }
    Ok(line.trim().to_string())
}

// Url::join drops the last path segment unless the base ends with '/'.
fn ensure_trailing_slash(mut url: String) -> String {
    if !url.is_empty() && !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_finnhub() {
        let cfg = FinnhubConfig::new("abc");
        assert_eq!(cfg.base_api_url, DEFAULT_BASE_API_URL);
        assert_eq!(cfg.ws_url_with_token(), "wss://ws.finnhub.io?token=abc");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(FinnhubConfig::default().validate(), Err(ConfigError::MissingApiKey)));
        assert!(matches!(FinnhubConfig::new("  ").validate(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn merge_prefers_non_empty_override() {
        let base = FinnhubConfig::new("from-file");
        let over = FinnhubConfig {
            api_key: String::new(),
            base_api_url: "http://127.0.0.1:9000/api".into(),
            ws_url: String::new(),
        };
        let merged = base.merge(over);
        assert_eq!(merged.api_key, "from-file");
        assert_eq!(merged.base_api_url, "http://127.0.0.1:9000/api/");
        assert_eq!(merged.ws_url, DEFAULT_WS_URL);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiKey":"k1","baseApiUrl":"http://localhost:1/v1"}}"#).unwrap();
        let cfg = FinnhubConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.api_key, "k1");
        assert_eq!(cfg.base_api_url, "http://localhost:1/v1/");
        assert_eq!(cfg.ws_url, DEFAULT_WS_URL);
    }

    #[test]
    fn prompt_reads_trimmed_line() {
        let mut input = io::Cursor::new("  AAPL \n");
        let mut output = Vec::new();
        let v = prompt_value(&mut input, &mut output, "Enter a stock symbol: ").unwrap();
        assert_eq!(v, "AAPL");
        assert_eq!(output, b"Enter a stock symbol: ");

        let mut empty = io::Cursor::new("");
        assert!(prompt_value(&mut empty, &mut Vec::new(), "x").is_err());
    }

    #[test]
    fn broken_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = FinnhubConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
