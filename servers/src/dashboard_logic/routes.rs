use crate::dashboard_logic::data::{DashboardData, Timeframe};
use crate::dashboard_logic::{figures, page};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type AppState = Arc<DashboardData>;

#[derive(Debug, Deserialize)]
pub struct TimeframeQuery {
    pub timeframe: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricQuery {
    pub metric: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/options", get(options_handler))
        .route("/api/overview", get(overview_handler))
        .route("/api/candles", get(candles_handler))
        .route("/api/annual", get(annual_handler))
        .route("/api/quarterly", get(quarterly_handler))
        .with_state(state)
}

pub async fn run(addr: SocketAddr, state: AppState, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.recv().await.ok();
            log::info!("Dashboard server shutting down.");
        })
        .await?;
    Ok(())
}

fn not_found(what: &str, value: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("Unknown {}: {}", what, value)).into_response()
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(page::render_index(&state.symbol))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn options_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "symbol": state.symbol,
        "timeframes": Timeframe::ALL.iter().map(Timeframe::label).collect::<Vec<_>>(),
        "annual": DashboardData::metric_options(&state.annual),
        "quarterly": DashboardData::metric_options(&state.quarterly),
    }))
}

async fn overview_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "metrics": figures::metrics_overview(&state.symbol, &state.metrics),
        "earnings": figures::earnings_surprises(&state.symbol, &state.earnings),
        "quote": figures::quote_table(&state.symbol, &state.quote),
    }))
}

async fn candles_handler(State(state): State<AppState>, Query(q): Query<TimeframeQuery>) -> Response {
    let label = q.timeframe.unwrap_or_else(|| Timeframe::ThreeYears.label().to_string());
    log::debug!("Rendering candles for '{}'", label);
    let Some(timeframe) = Timeframe::from_label(&label) else {
        return not_found("timeframe", &label);
    };
    match state.candles_for(timeframe) {
        Some(table) => Json(figures::candlestick(&state.symbol, timeframe.label(), table)).into_response(),
        None => not_found("timeframe", &label),
    }
}

async fn annual_handler(State(state): State<AppState>, Query(q): Query<MetricQuery>) -> Response {
    period_response(&state, "Annual", q.metric, |s| &s.annual, "lightgreen")
}

async fn quarterly_handler(State(state): State<AppState>, Query(q): Query<MetricQuery>) -> Response {
    period_response(&state, "Quarterly", q.metric, |s| &s.quarterly, "orange")
}

fn period_response(
    state: &DashboardData,
    period: &str,
    metric: Option<String>,
    series: fn(&DashboardData) -> &lib_common::markets::finnhub::Table,
    color: &str,
) -> Response {
    let table = series(state);
    let metric = metric
        .or_else(|| DashboardData::metric_options(table).first().map(|m| m.to_string()))
        .unwrap_or_default();
    log::debug!("Rendering {} '{}'", period, metric);
    match figures::period_bar(&state.symbol, period, &metric, table, color) {
        Some(fig) => Json(fig).into_response(),
        None => not_found("metric", &metric),
    }
}
