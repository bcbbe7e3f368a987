use anyhow::{Context, Result};
use lib_common::loggers::loggerlocal::setup_logging;
use lib_common::markets::finnhub::FinnhubConnector;
use std::io;
use std::sync::Arc;
use tokio::signal;

mod dashboard_logic;
use dashboard_logic::{config, data::DashboardData, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let (mut config, config_warnings) = config::load_config();
    config
        .prompt_missing(&mut io::stdin().lock(), &mut io::stdout())
        .context("Reading API key and symbol from stdin")?;

    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    if let Some(path) = setup_logging("server_dashboard", config.log_dir.as_deref(), &log_level)? {
        log::info!("Logging to {}", path.display());
    }
    for warning in &config_warnings {
        log::warn!("{}", warning);
    }

    let symbol = config.symbol.clone().unwrap_or_default();
    let connector = FinnhubConnector::new(config.finnhub_config())?;

    let today = chrono::Local::now().date_naive();
    let data = match DashboardData::load(&connector, &symbol, today).await {
        Ok(data) => Arc::new(data),
        Err(e) => {
            log::error!("Could not load dashboard data for {}: {}", symbol, e);
            return Err(e.into());
        }
    };

    let addr = config.listen_addr()?;
    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    let server_handle = tokio::spawn(routes::run(addr, data, shutdown_tx.subscribe()));

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        log::info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        log::warn!("Could not install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }

    let _ = shutdown_tx.send(());
    server_handle.await??;

    log::info!("Shutdown complete.");
    Ok(())
}
