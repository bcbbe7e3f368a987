//! # Finnhub Response Models
//!
//! Strongly-typed mirrors of the JSON payloads, one per endpoint. Payloads
//! are validated here at the API boundary; the connector only maps these
//! structs onto tables with fixed column labels.

use crate::transforms::normalize::MetricValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `stock/symbol` entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StockSymbol {
    pub currency: Option<String>,
    pub description: Option<String>,
    pub display_symbol: Option<String>,
    pub figi: Option<String>,
    pub isin: Option<String>,
    pub mic: Option<String>,
    #[serde(rename = "shareClassFIGI")]
    pub share_class_figi: Option<String>,
    pub symbol: Option<String>,
    pub symbol2: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `search` response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchResponse {
    pub count: u64,
    pub result: Vec<SearchResult>,
}

/// One `search` match.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub description: Option<String>,
    pub display_symbol: Option<String>,
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `company-news` article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub category: Option<String>,
    /// Unix seconds.
    pub datetime: i64,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single fiscal-period observation of a metric series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: String,
    #[serde(default)]
    pub v: Option<f64>,
}

/// `series` block of `stock/metric`. Metric code -> observations, upstream order kept.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricSeries {
    #[serde(default)]
    pub annual: Option<Map<String, Value>>,
    #[serde(default)]
    pub quarterly: Option<Map<String, Value>>,
}

/// `stock/metric?metric=all` response.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicFinancialsResponse {
    pub metric: Map<String, Value>,
    pub metric_type: Option<String>,
    pub series: MetricSeries,
    pub symbol: Option<String>,
}

impl BasicFinancialsResponse {
    /// The `metric` object as ordered key/value pairs. `null` entries are skipped.
    pub fn metric_values(&self) -> Vec<(String, MetricValue)> {
        self.metric
            .iter()
            .filter_map(|(k, v)| {
                let value = match v {
                    Value::Number(n) => MetricValue::Number(n.as_f64()?),
                    Value::String(s) => MetricValue::Text(s.clone()),
                    Value::Bool(b) => MetricValue::Text(b.to_string()),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((k.clone(), value))
            })
            .collect()
    }
}

/// Decodes one metric's observations, skipping malformed entries.
pub fn series_points(raw: &Value) -> Vec<SeriesPoint> {
    raw.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<SeriesPoint>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// `stock/earnings` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSurprise {
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub estimate: Option<f64>,
    pub period: String,
    #[serde(default)]
    pub quarter: Option<i64>,
    #[serde(default)]
    pub surprise: Option<f64>,
    #[serde(default)]
    pub surprise_percent: Option<f64>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
}

/// `quote` response. All fields are zero/absent for an unknown symbol.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Quote {
    pub c: Option<f64>,
    pub d: Option<f64>,
    pub dp: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub o: Option<f64>,
    pub pc: Option<f64>,
    pub t: i64,
}

/// `stock/candle` and `crypto/candle` response: parallel arrays plus a status.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CandlesResponse {
    pub c: Vec<f64>,
    pub h: Vec<f64>,
    pub l: Vec<f64>,
    pub o: Vec<f64>,
    pub s: String,
    pub t: Vec<i64>,
    pub v: Vec<f64>,
}

impl CandlesResponse {
    /// True when status is `ok`, the arrays are non-empty and all of equal length.
    pub fn is_complete(&self) -> bool {
        let n = self.t.len();
        self.s == "ok"
            && n > 0
            && [self.c.len(), self.h.len(), self.l.len(), self.o.len(), self.v.len()]
                .iter()
                .all(|&len| len == n)
    }
}

/// `crypto/symbol` entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CryptoSymbol {
    pub description: Option<String>,
    pub display_symbol: Option<String>,
    pub symbol: Option<String>,
}

/// Subscribe frame for the trade stream.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub symbol: &'a str,
}

impl<'a> SubscribeMessage<'a> {
    /// `{"type":"subscribe","symbol":"<symbol>"}`.
    pub fn subscribe(symbol: &'a str) -> Self {
        Self { kind: "subscribe", symbol }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metric_values_keep_upstream_order() {
        let raw = json!({
            "metric": {"52WeekHigh": 199.6, "52WeekHighDate": "2023-12-14", "beta": null, "pb": 45},
            "metricType": "all",
            "series": {"annual": {}, "quarterly": {}},
            "symbol": "AAPL"
        });
        let resp: BasicFinancialsResponse = serde_json::from_value(raw).unwrap();
        let keys: Vec<String> = resp.metric_values().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["52WeekHigh", "52WeekHighDate", "pb"]);
        assert_eq!(resp.metric_values()[2].1, MetricValue::Number(45.0));
    }

    #[test]
    fn candle_completeness() {
        let ok: CandlesResponse = serde_json::from_value(json!({
            "c": [1.0], "h": [1.0], "l": [1.0], "o": [1.0], "s": "ok", "t": [1], "v": [10]
        }))
        .unwrap();
        assert!(ok.is_complete());

        let none: CandlesResponse = serde_json::from_value(json!({"s": "no_data"})).unwrap();
        assert!(!none.is_complete());
    }

    #[test]
    fn subscribe_frame_shape() {
        let s = serde_json::to_string(&SubscribeMessage::subscribe("BINANCE:BTCUSDT")).unwrap();
        assert_eq!(s, r#"{"type":"subscribe","symbol":"BINANCE:BTCUSDT"}"#);
    }

    #[test]
    fn series_points_skip_garbage() {
        let pts = series_points(&json!([{"period": "2023-09-30", "v": 1.5}, {"bad": 1}, {"period": "2022-09-30", "v": null}]));
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].v, None);
    }
}
