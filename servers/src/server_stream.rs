//! Relays Finnhub trade messages for one symbol to stdout until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use lib_common::configs::config_finnhub::{prompt_value, FinnhubConfig};
use lib_common::loggers::loggerlocal::setup_logging;
use lib_common::markets::finnhub::FinnhubConnector;
use std::io;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(about = "Print live Finnhub trades for a symbol", version)]
struct Args {
    #[clap(long, env = "FINNHUB_API_KEY", help = "Finnhub API key.")]
    api_key: Option<String>,

    #[clap(long, env = "FINNHUB_SYMBOL", help = "Symbol to subscribe to, e.g. AAPL or BINANCE:BTCUSDT.")]
    symbol: Option<String>,

    #[clap(long, env = "STREAM_CONFIG_PATH", help = "JSON file with apiKey/baseApiUrl/wsUrl.")]
    config_path: Option<PathBuf>,

    #[clap(long, env = "FINNHUB_WS_URL", help = "Finnhub WebSocket URL.")]
    ws_url: Option<String>,

    #[clap(long, env = "STREAM_LOG_DIR", help = "Directory for log files.")]
    log_dir: Option<PathBuf>,

    #[clap(long, env = "STREAM_LOG_LEVEL", default_value = "info", help = "Logging level.")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    setup_logging("server_stream", args.log_dir.as_deref(), &args.log_level)?;

    let mut finnhub = match &args.config_path {
        Some(path) => FinnhubConfig::from_file(path)?,
        None => FinnhubConfig::default(),
    };
    finnhub = finnhub.merge(FinnhubConfig {
        api_key: args.api_key.clone().unwrap_or_default(),
        base_api_url: String::new(),
        ws_url: args.ws_url.clone().unwrap_or_default(),
    });

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();
    if finnhub.validate().is_err() {
        finnhub.api_key = prompt_value(&mut stdin, &mut stdout, "Paste your Finnhub API key: ")?;
    }
    let symbol = match args.symbol.filter(|s| !s.trim().is_empty()) {
        Some(s) => s,
        None => prompt_value(&mut stdin, &mut stdout, "Enter a symbol: ")?,
    };
    drop(stdin);

    let connector = FinnhubConnector::new(finnhub)?;
    let cancel = CancellationToken::new();
    let mut stream = connector
        .stream_websocket(&symbol, cancel.clone())
        .await
        .with_context(|| format!("Opening trade stream for {}", symbol))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupt received, closing stream.");
                break;
            }
            msg = stream.recv() => {
                match msg {
                    Some(text) => {
                        println!("{}", text);
                        println!();
                    }
                    None => {
                        log::warn!("Stream ended by remote host.");
                        break;
                    }
                }
            }
        }
    }

    stream.close().await;
    println!("####### CONNECTION CLOSED #######");
    Ok(())
}
