//! # Finnhub Connector
//!
//! Read-only fetch operations keyed by ticker symbol (and optionally a date
//! range and resolution). Each operation returns a [`Table`] with human
//! readable column labels; time-indexed tables are sorted chronologically.
//! Empty or malformed upstream results surface as a [`FinnhubError`].

use super::apicall::ApiCallFinnhub;
use super::candles::{format_unix, CandleRange, Resolution};
use super::error::{FinnhubError, FinnhubResult};
use super::models::{
    series_points, BasicFinancialsResponse, CandlesResponse, CryptoSymbol, EarningsSurprise, NewsArticle,
    Quote, SearchResponse, StockSymbol,
};
use super::streaming::{self, FinnhubStream};
use super::table::{Cell, Table, TableBuilder};
use crate::configs::config_finnhub::FinnhubConfig;
use crate::transforms::normalize::MetricValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Crypto exchange codes accepted by `crypto/symbol`.
pub const CRYPTO_EXCHANGES: [&str; 14] = [
    "FXPIG", "KUCOIN", "GEMINI", "BITTREX", "POLONIEX", "HUOBI", "BINANCEUS", "COINBASE", "BITFINEX",
    "KRAKEN", "HITBTC", "OKEX", "BITMEX", "BINANCE",
];

/// Column labels of `north_american_stocks`.
pub const STOCK_SYMBOL_COLUMNS: [&str; 6] = ["Currency", "Description", "Symbol", "FIGI", "MIC", "Type"];
/// Column labels of `look_up_stock`.
pub const SEARCH_COLUMNS: [&str; 3] = ["Description", "Symbol", "Type"];
/// Column labels of `company_news`.
pub const NEWS_COLUMNS: [&str; 8] = [
    "Category", "Headline", "ID", "Image", "Related to (symbol)", "Source", "Summary", "URL",
];
/// Column labels of `earnings_surprises`.
pub const EARNINGS_COLUMNS: [&str; 7] = [
    "Actual", "Estimate", "Quarter", "Surprise", "Surprise percent", "Symbol", "Year",
];
/// Column labels of `current_quote`.
pub const QUOTE_COLUMNS: [&str; 8] = [
    "Current price",
    "Change",
    "Percent change",
    "High price of the day",
    "Low price of the day",
    "Open price of the day",
    "Previous close price",
    "Time",
];
/// Column labels of the candle tables.
pub const CANDLE_COLUMNS: [&str; 6] = ["Close", "High", "Low", "Open", "Status", "Volume"];
/// Column labels of `crypto_symbols`.
pub const CRYPTO_SYMBOL_COLUMNS: [&str; 3] = ["Description", "Display symbol", "Symbol"];

const NEWS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const CANDLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Annual and quarterly series plus the latest metric snapshot.
#[derive(Debug, Clone)]
pub struct BasicFinancials {
    /// Symbol the data belongs to.
    pub symbol: String,
    /// Annual series: index `Datetime` (period), one column per metric code.
    pub annual: Table,
    /// Quarterly series, same layout.
    pub quarterly: Table,
    /// Latest metric values in upstream key order.
    pub metrics: Vec<(String, MetricValue)>,
}

impl BasicFinancials {
    /// Looks up one metric of the snapshot.
    pub fn metric(&self, key: &str) -> Option<&MetricValue> {
        self.metrics.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Which candle endpoint to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Market {
    Stock,
    Crypto,
}

impl Market {
    fn path(&self) -> &'static str {
        match self {
            Market::Stock => "stock/candle",
            Market::Crypto => "crypto/candle",
        }
    }
}

/// Client for the Finnhub endpoints used by the dashboard.
pub struct FinnhubConnector {
    config: FinnhubConfig,
    api_call: ApiCallFinnhub,
}

impl FinnhubConnector {
    /// Builds a connector from an explicit configuration.
    ///
    /// # Errors
    /// Fails when the key is empty or the base URL is not absolute.
    pub fn new(config: FinnhubConfig) -> FinnhubResult<Self> {
        let api_call = ApiCallFinnhub::new(&config)?;
        Ok(Self { config, api_call })
    }

    /// The configuration this connector was built with.
    pub fn config(&self) -> &FinnhubConfig {
        &self.config
    }

    /// US-listed symbols, sorted by symbol, with test rows removed.
    pub async fn north_american_stocks(&self) -> FinnhubResult<Table> {
        let symbols: Vec<StockSymbol> = self
            .api_call
            .fetch_finnhub("stock/symbol", &[("exchange", "US".to_string())])
            .await?;

        let mut b = TableBuilder::new("", STOCK_SYMBOL_COLUMNS);
        for s in symbols.into_iter().filter(|s| s.description.as_deref() != Some("Test")) {
            b.push(
                "",
                vec![
                    s.currency.into(),
                    s.description.into(),
                    s.display_symbol.into(),
                    s.figi.into(),
                    s.mic.into(),
                    s.kind.into(),
                ],
            );
        }
        Ok(b.build_sorted_by_column("Symbol"))
    }

    /// Searches by symbol, name, ISIN or CUSIP.
    pub async fn look_up_stock(&self, search_query: &str) -> FinnhubResult<Table> {
        let resp: SearchResponse = self
            .api_call
            .fetch_finnhub("search", &[("q", search_query.to_string())])
            .await?;

        if resp.result.is_empty() {
            log::warn!("Search returned nothing for '{}'", search_query);
            return Err(FinnhubError::Lookup(search_query.to_string()));
        }

        let mut b = TableBuilder::new("Search results", SEARCH_COLUMNS);
        for (i, r) in resp.result.into_iter().enumerate() {
            b.push(i.to_string(), vec![r.description.into(), r.display_symbol.into(), r.kind.into()]);
        }
        Ok(b.build())
    }

    /// Company news between two `yyyy-mm-dd` dates, oldest first.
    pub async fn company_news(&self, symbol: &str, start_date: &str, end_date: &str) -> FinnhubResult<Table> {
        let articles: Vec<NewsArticle> = self
            .api_call
            .fetch_finnhub(
                "company-news",
                &[
                    ("symbol", symbol.to_string()),
                    ("from", start_date.to_string()),
                    ("to", end_date.to_string()),
                ],
            )
            .await?;

        if articles.is_empty() {
            log::warn!("No news for {} between {} and {}", symbol, start_date, end_date);
            return Err(FinnhubError::EmptyResult(format!(
                "{} FROM {} TO {}",
                symbol, start_date, end_date
            )));
        }

        let mut b = TableBuilder::new("Datetime", NEWS_COLUMNS);
        for a in articles {
            b.push(
                format_unix(a.datetime, NEWS_TIME_FORMAT)?,
                vec![
                    a.category.into(),
                    a.headline.into(),
                    a.id.into(),
                    a.image.into(),
                    a.related.into(),
                    a.source.into(),
                    a.summary.into(),
                    a.url.into(),
                ],
            );
        }
        Ok(b.build_sorted())
    }

    /// Annual and quarterly metric series plus the latest snapshot.
    pub async fn basic_financials(&self, symbol: &str) -> FinnhubResult<BasicFinancials> {
        let resp: BasicFinancialsResponse = self
            .api_call
            .fetch_finnhub(
                "stock/metric",
                &[("symbol", symbol.to_string()), ("metric", "all".to_string())],
            )
            .await?;

        let no_data = || FinnhubError::EmptyResult(symbol.to_string());
        let annual = resp.series.annual.as_ref().ok_or_else(no_data)?;
        let quarterly = resp.series.quarterly.as_ref().ok_or_else(no_data)?;

        Ok(BasicFinancials {
            symbol: resp.symbol.clone().unwrap_or_else(|| symbol.to_string()),
            annual: series_table(annual),
            quarterly: series_table(quarterly),
            metrics: resp.metric_values(),
        })
    }

    /// Reported vs. estimated earnings per quarter, oldest first.
    pub async fn earnings_surprises(&self, symbol: &str) -> FinnhubResult<Table> {
        let rows: Vec<EarningsSurprise> = self
            .api_call
            .fetch_finnhub("stock/earnings", &[("symbol", symbol.to_string())])
            .await?;

        if rows.is_empty() {
            return Err(FinnhubError::EmptyResult(symbol.to_string()));
        }

        let mut b = TableBuilder::new("Period", EARNINGS_COLUMNS);
        for e in rows {
            b.push(
                e.period,
                vec![
                    e.actual.into(),
                    e.estimate.into(),
                    e.quarter.into(),
                    e.surprise.into(),
                    e.surprise_percent.into(),
                    e.symbol.into(),
                    e.year.into(),
                ],
            );
        }
        Ok(b.build_sorted())
    }

    /// Real-time quote as a single row indexed `Value`.
    pub async fn current_quote(&self, symbol: &str) -> FinnhubResult<Table> {
        let q: Quote = self
            .api_call
            .fetch_finnhub("quote", &[("symbol", symbol.to_string())])
            .await?;

        if q.t == 0 {
            return Err(FinnhubError::EmptyResult(symbol.to_string()));
        }

        let mut b = TableBuilder::new("", QUOTE_COLUMNS);
        b.push(
            "Value",
            vec![
                q.c.into(),
                q.d.into(),
                q.dp.into(),
                q.h.into(),
                q.l.into(),
                q.o.into(),
                q.pc.into(),
                Cell::Text(format_unix(q.t, NEWS_TIME_FORMAT)?),
            ],
        );
        Ok(b.build())
    }

    /// Stock OHLCV candles for `range` at `resolution`, oldest first.
    pub async fn stock_candles(&self, symbol: &str, resolution: Resolution, range: &CandleRange) -> FinnhubResult<Table> {
        self.candles(Market::Stock, symbol, resolution, range).await
    }

    /// Crypto symbols listed on `exchange` (see [`CRYPTO_EXCHANGES`]).
    pub async fn crypto_symbols(&self, exchange: &str) -> FinnhubResult<Table> {
        let symbols: Vec<CryptoSymbol> = self
            .api_call
            .fetch_finnhub("crypto/symbol", &[("exchange", exchange.to_string())])
            .await?;

        if symbols.is_empty() {
            return Err(FinnhubError::InvalidExchange(exchange.to_string()));
        }

        let mut b = TableBuilder::new("", CRYPTO_SYMBOL_COLUMNS);
        for (i, s) in symbols.into_iter().enumerate() {
            b.push(i.to_string(), vec![s.description.into(), s.display_symbol.into(), s.symbol.into()]);
        }
        Ok(b.build())
    }

    /// Crypto candles. `symbol` is `EXCHANGE:PAIR`, e.g. `BINANCE:BTCUSDT`.
    pub async fn crypto_candles(&self, symbol: &str, resolution: Resolution, range: &CandleRange) -> FinnhubResult<Table> {
        self.candles(Market::Crypto, symbol, resolution, range).await
    }

    /// Opens the trade stream for `symbol`; it runs until `cancel` fires.
    pub async fn stream_websocket(&self, symbol: &str, cancel: CancellationToken) -> FinnhubResult<FinnhubStream> {
        streaming::connect(&self.config, symbol, cancel).await
    }

    async fn candles(
        &self,
        market: Market,
        symbol: &str,
        resolution: Resolution,
        range: &CandleRange,
    ) -> FinnhubResult<Table> {
        let no_data = || {
            FinnhubError::EmptyResult(format!("{} FROM {} TO {}", symbol, range.label_from, range.label_to))
        };

        let resp: CandlesResponse = self
            .api_call
            .fetch_finnhub(
                market.path(),
                &[
                    ("symbol", symbol.to_string()),
                    ("resolution", resolution.to_string()),
                    ("from", range.from.to_string()),
                    ("to", range.to.to_string()),
                ],
            )
            .await
            .map_err(|e| match e {
                FinnhubError::Decode { .. } => no_data(),
                other => other,
            })?;

        if !resp.is_complete() {
            log::warn!("Candles for {} at {} have status '{}'", symbol, resolution, resp.s);
            return Err(no_data());
        }

        let mut b = TableBuilder::new("Datetime", CANDLE_COLUMNS);
        for i in 0..resp.t.len() {
            b.push(
                format_unix(resp.t[i], CANDLE_TIME_FORMAT)?,
                vec![
                    resp.c[i].into(),
                    resp.h[i].into(),
                    resp.l[i].into(),
                    resp.o[i].into(),
                    resp.s.as_str().into(),
                    resp.v[i].into(),
                ],
            );
        }
        Ok(b.build_sorted())
    }
}

/// Builds one series table: rows are fiscal periods, columns are metric codes
/// in upstream order. Observations are aligned by period, not by position.
fn series_table(series: &Map<String, Value>) -> Table {
    let codes: Vec<&String> = series.keys().collect();
    let mut by_period: BTreeMap<String, Vec<Cell>> = BTreeMap::new();

    for (col, code) in codes.iter().enumerate() {
        for point in series_points(&series[code.as_str()]) {
            let row = by_period
                .entry(point.period)
                .or_insert_with(|| vec![Cell::Null; codes.len()]);
            row[col] = point.v.into();
        }
    }

    let mut b = TableBuilder::new("Datetime", codes.iter().map(|c| c.to_string()));
    for (period, cells) in by_period {
        b.push(period, cells);
    }
    b.build_sorted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn series_align_by_period() {
        let raw = json!({
            "eps": [{"period": "2023-09-30", "v": 6.13}, {"period": "2022-09-30", "v": 6.11}],
            "pb": [{"period": "2023-09-30", "v": 45.1}]
        });
        let t = series_table(raw.as_object().unwrap());
        assert_eq!(t.columns(), ["eps", "pb"]);
        assert_eq!(t.index(), ["2022-09-30", "2023-09-30"]);
        assert_eq!(t.get("2022-09-30", "pb"), Some(&Cell::Null));
        assert_eq!(t.get("2023-09-30", "pb"), Some(&Cell::Number(45.1)));
    }

    #[test]
    fn empty_key_is_rejected_at_construction() {
        assert!(FinnhubConnector::new(FinnhubConfig::default()).is_err());
    }
}
