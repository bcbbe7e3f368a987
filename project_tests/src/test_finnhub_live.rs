//! # Finnhub Live Smoke Test
//!
//! Calls every connector operation against the real Finnhub API and prints
//! a short summary of each table. Needs a valid key in `FINNHUB_API_KEY`
//! (or `--api-key`); it is not part of `cargo test`.

use anyhow::Result;
use chrono::{Days, Utc};
use clap::Parser;
use lib_common::configs::config_finnhub::FinnhubConfig;
use lib_common::loggers::loggerlocal::setup_logging;
use lib_common::markets::finnhub::{CandleRange, FinnhubConnector, Resolution, Table};
use lib_common::transforms::normalize::normalize_metrics;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(about = "Live smoke test of the Finnhub connector")]
struct Args {
    #[clap(long, env = "FINNHUB_API_KEY")]
    api_key: String,

    #[clap(long, default_value = "AAPL")]
    symbol: String,

    #[clap(long, default_value = "BINANCE")]
    exchange: String,

    /// Seconds to keep the trade stream open; 0 skips it.
    #[clap(long, default_value_t = 5)]
    stream_seconds: u64,
}

/// Prints the shape of a table and its last row.
fn summarize(name: &str, table: &Table) {
    println!("[OK] {}: {} rows x {} columns", name, table.len(), table.columns().len());
    if let Some(last) = table.rows().last() {
        let cells: Vec<String> = last.cells.iter().map(|c| c.to_string()).collect();
        println!("     {} = {}", last.key, cells.join(" | "));
    }
}

/// Prints the outcome of one operation and counts failures.
fn report(name: &str, result: Result<Table, lib_common::markets::finnhub::FinnhubError>, failures: &mut u32) {
    match result {
        Ok(table) => summarize(name, &table),
        Err(e) => {
            eprintln!("[ERROR] {}: {}", name, e);
            *failures += 1;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    setup_logging("test_finnhub_live", None, "debug")?;

    let connector = FinnhubConnector::new(FinnhubConfig::new(args.api_key.clone()))?;
    let today = Utc::now().date_naive();
    let week_ago = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    let range = CandleRange::from_dates(week_ago, today)?;
    let (from, to) = (week_ago.format("%Y-%m-%d").to_string(), today.format("%Y-%m-%d").to_string());
    let mut failures = 0;

    println!("--- Starting Finnhub live tests for {} ---", args.symbol);

    report("north_american_stocks", connector.north_american_stocks().await, &mut failures);
    report("look_up_stock", connector.look_up_stock(&args.symbol).await, &mut failures);
    report("company_news", connector.company_news(&args.symbol, &from, &to).await, &mut failures);
    report("earnings_surprises", connector.earnings_surprises(&args.symbol).await, &mut failures);
    report("current_quote", connector.current_quote(&args.symbol).await, &mut failures);
    report(
        "stock_candles",
        connector.stock_candles(&args.symbol, Resolution::Day, &range).await,
        &mut failures,
    );
    report("crypto_symbols", connector.crypto_symbols(&args.exchange).await, &mut failures);
    report(
        "crypto_candles",
        connector.crypto_candles("BINANCE:BTCUSDT", Resolution::Min60, &range).await,
        &mut failures,
    );

    match connector.basic_financials(&args.symbol).await {
        Ok(bf) => {
            summarize("basic_financials.annual", &bf.annual);
            summarize("basic_financials.quarterly", &bf.quarterly);
            for m in normalize_metrics(&bf.metrics).iter().take(5) {
                println!("     {} -> {:?}", m.label(), m.display_value());
            }
        }
        Err(e) => {
            eprintln!("[ERROR] basic_financials: {}", e);
            failures += 1;
        }
    }

    if args.stream_seconds > 0 {
        let cancel = CancellationToken::new();
        match connector.stream_websocket("BINANCE:BTCUSDT", cancel.clone()).await {
            Ok(mut stream) => {
                let deadline = tokio::time::sleep(Duration::from_secs(args.stream_seconds));
                tokio::pin!(deadline);
                let mut received = 0;
                loop {
                    tokio::select! {
                        _ = &mut deadline => break,
                        msg = stream.recv() => match msg {
                            Some(_) => received += 1,
                            None => break,
                        },
                    }
                }
                stream.close().await;
                println!("[OK] stream_websocket: {} messages in {}s", received, args.stream_seconds);
            }
            Err(e) => {
                eprintln!("[ERROR] stream_websocket: {}", e);
                failures += 1;
            }
        }
    }

    println!("--- Finished with {} failure(s) ---", failures);
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
