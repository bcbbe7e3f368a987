use anyhow::Result;
use clap::Parser;
use lib_common::configs::config_finnhub::{prompt_value, FinnhubConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "Interactive Finnhub financial dashboard", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "FINNHUB_API_KEY", help = "Finnhub API key.")]
    pub api_key: Option<String>,

    #[clap(long, env = "FINNHUB_SYMBOL", help = "Stock symbol to chart, e.g. AAPL.")]
    pub symbol: Option<String>,

    #[clap(long, env = "DASHBOARD_PORT", help = "Port the dashboard listens on.")]
    pub port: Option<u16>,

    #[clap(long, env = "DASHBOARD_BIND", help = "Address the dashboard binds to.")]
    pub bind: Option<String>,

    #[clap(long, env = "DASHBOARD_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "DASHBOARD_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "DASHBOARD_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error, fatal).")]
    pub log_level: Option<String>,

    #[clap(long, env = "FINNHUB_BASE_API_URL", help = "Finnhub REST base URL.")]
    pub base_api_url: Option<String>,

    #[clap(long, env = "FINNHUB_WS_URL", help = "Finnhub WebSocket URL.")]
    pub ws_url: Option<String>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    pub fn merge(self, other: Config) -> Config {
        Config {
            api_key: non_empty(other.api_key).or(self.api_key),
            symbol: non_empty(other.symbol).or(self.symbol),
            port: other.port.or(self.port),
            bind: other.bind.or(self.bind),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            base_api_url: other.base_api_url.or(self.base_api_url),
            ws_url: other.ws_url.or(self.ws_url),
        }
    }

    pub fn defaults() -> Config {
        Config {
            port: Some(8050),
            bind: Some("127.0.0.1".to_string()),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            ..Default::default()
        }
    }

    /// Asks on `input` for the API key and symbol when no other source set them.
    pub fn prompt_missing<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<()> {
        if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            self.api_key = Some(prompt_value(input, output, "Paste your Finnhub API key: ")?);
        }
        if self.symbol.as_deref().is_none_or(|s| s.trim().is_empty()) {
            self.symbol = Some(prompt_value(input, output, "Enter a stock symbol: ")?);
        }
        if let Some(symbol) = self.symbol.take() {
            self.symbol = Some(symbol.trim().to_uppercase());
        }
        Ok(())
    }

    /// Connector settings derived from this config. Unset URLs keep the Finnhub defaults.
    pub fn finnhub_config(&self) -> FinnhubConfig {
        FinnhubConfig::default().merge(FinnhubConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            base_api_url: self.base_api_url.clone().unwrap_or_default(),
            ws_url: self.ws_url.clone().unwrap_or_default(),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let bind = self.bind.as_deref().unwrap_or("127.0.0.1");
        let port = self.port.unwrap_or(8050);
        Ok(format!("{}:{}", bind, port).parse()?)
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// `Ok(None)` when the file does not exist; `Err` carries a warning for the caller to log.
fn read_config_file(path: &Path) -> std::result::Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let config_str = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file: {} ({}). Falling back to other sources.", path.display(), e))?;
    serde_json::from_str::<Config>(&config_str)
        .map(Some)
        .map_err(|e| format!("Failed to parse config file: {} ({}). Falling back to other sources.", path.display(), e))
}

/// Defaults < JSON file < env/CLI. The interactive prompt runs later, in `main`.
///
/// Runs before logging exists, so problems with the file come back as
/// warnings for `main` to log once the logger is up.
pub fn resolve_config(cli: Config) -> (Config, Vec<String>) {
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("server_dashboard.conf"));

    let mut warnings = Vec::new();
    let mut current_config = Config::defaults();
    match read_config_file(&config_file_path) {
        Ok(Some(file_config)) => current_config = current_config.merge(file_config),
        Ok(None) => {}
        Err(warning) => warnings.push(warning),
    }
    (current_config.merge(cli), warnings)
}

pub fn load_config() -> (Config, Vec<String>) {
    resolve_config(Config::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write as _};

    #[test]
    fn cli_overrides_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiKey":"from-file","symbol":"MSFT","port":9000}}"#).unwrap();

        let cli = Config {
            config_path: Some(file.path().to_path_buf()),
            symbol: Some("AAPL".into()),
            ..Default::default()
        };
        let (cfg, warnings) = resolve_config(cli);
        assert!(warnings.is_empty());
        assert_eq!(cfg.api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.symbol.as_deref(), Some("AAPL"));
        assert_eq!(cfg.port, Some(9000));
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn malformed_file_falls_back_with_a_warning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let (cfg, warnings) = resolve_config(Config {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        });
        assert_eq!(cfg.port, Some(8050));
        assert_eq!(cfg.api_key, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse config file"), "{}", warnings[0]);
    }

    #[test]
    fn missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (cfg, warnings) = resolve_config(Config {
            config_path: Some(dir.path().join("absent.conf")),
            ..Default::default()
        });
        assert!(warnings.is_empty());
        assert_eq!(cfg.bind.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn prompt_only_asks_for_missing_values() {
        let mut cfg = Config {
            api_key: Some("k".into()),
            ..Config::defaults()
        };
        let mut input = Cursor::new("aapl\n");
        let mut output = Vec::new();
        cfg.prompt_missing(&mut input, &mut output).unwrap();
        assert_eq!(cfg.symbol.as_deref(), Some("AAPL"));
        assert_eq!(String::from_utf8(output).unwrap(), "Enter a stock symbol: ");
    }

    #[test]
    fn empty_cli_key_does_not_hide_file_key() {
        let merged = Config {
            api_key: Some("file".into()),
            ..Default::default()
        }
        .merge(Config {
            api_key: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(merged.api_key.as_deref(), Some("file"));
    }

    #[test]
    fn finnhub_config_keeps_default_urls() {
        let cfg = Config {
            api_key: Some("k".into()),
            base_api_url: Some("http://127.0.0.1:1/api/v1".into()),
            ..Default::default()
        };
        let fh = cfg.finnhub_config();
        assert_eq!(fh.api_key, "k");
        assert_eq!(fh.base_api_url, "http://127.0.0.1:1/api/v1/");
        assert_eq!(fh.ws_url, "wss://ws.finnhub.io");
        assert_eq!(Config::defaults().listen_addr().unwrap().port(), 8050);
    }
}
