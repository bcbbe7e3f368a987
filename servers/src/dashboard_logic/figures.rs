//! Plotly figure specifications built from the dashboard tables.
//!
//! Every builder is a pure function from borrowed tables to a JSON figure
//! (`{"data": [...], "layout": {...}}`) that the page hands to `Plotly.react`.

use lib_common::markets::finnhub::{Cell, Table};
use lib_common::transforms::normalize::{normalize_metrics, MetricValue};
use serde_json::{json, Value};

const TEMPLATE: &str = "plotly_dark";
const HIGH_DATE: &str = "52WeekHighDate";
const LOW_DATE: &str = "52WeekLowDate";

fn cell_json(cell: &Cell) -> Value {
    match cell {
        Cell::Number(n) => json!(n),
        Cell::Integer(i) => json!(i),
        Cell::Text(s) => json!(s),
        Cell::Null => Value::Null,
    }
}

fn numeric(table: &Table, label: &str) -> Vec<Option<f64>> {
    table.numeric_column(label).unwrap_or_default()
}

/// Horizontal bar chart of every numeric metric, normalised into the display band.
///
/// The 52-week high/low dates cannot be plotted; they are written beside
/// their value bars instead.
pub fn metrics_overview(symbol: &str, metrics: &[(String, MetricValue)]) -> Value {
    let normalized = normalize_metrics(metrics);
    let bars: Vec<_> = normalized
        .iter()
        .filter(|m| m.key != HIGH_DATE && m.key != LOW_DATE)
        .filter_map(|m| m.display_value().map(|v| (m.key.as_str(), m.label(), v)))
        .collect();

    let mut annotations = Vec::new();
    for (value_key, date_key) in [("52WeekHigh", HIGH_DATE), ("52WeekLow", LOW_DATE)] {
        let date = metrics.iter().find_map(|(k, v)| match v {
            MetricValue::Text(s) if k == date_key => Some(s.as_str()),
            _ => None,
        });
        let bar = bars.iter().find(|(key, _, _)| *key == value_key);
        if let (Some(date), Some((_, label, value))) = (date, bar) {
            annotations.push(json!({
                "x": value + 10.0,
                "y": label,
                "text": date,
                "showarrow": false,
            }));
        }
    }

    json!({
        "data": [{
            "type": "bar",
            "orientation": "h",
            "x": bars.iter().map(|(_, _, v)| *v).collect::<Vec<_>>(),
            "y": bars.iter().map(|(_, label, _)| label.as_str()).collect::<Vec<_>>(),
            "marker": {"color": "yellowgreen"},
        }],
        "layout": {
            "template": TEMPLATE,
            "title": {"text": format!("{} Basic Stock Info", symbol), "x": 0.5},
            "height": 3500,
            "xaxis": {"title": {"text": "Normalized value between (-)(5 to 100)"}},
            "font": {"size": 15},
            "annotations": annotations,
        }
    })
}

/// Grouped bars of estimated vs. actual earnings per quarter.
pub fn earnings_surprises(symbol: &str, earnings: &Table) -> Value {
    let quarters = earnings.column("Quarter").unwrap_or_default();
    let labels: Vec<String> = earnings
        .index()
        .into_iter()
        .zip(quarters)
        .map(|(period, quarter)| format!("{}  ({})", quarter, period))
        .collect();

    json!({
        "data": [
            {
                "type": "bar",
                "name": "Predicted",
                "x": labels,
                "y": numeric(earnings, "Estimate"),
                "offsetgroup": 0,
                "marker": {"color": "skyblue"},
            },
            {
                "type": "bar",
                "name": "Actual",
                "x": labels,
                "y": numeric(earnings, "Actual"),
                "offsetgroup": 1,
                "marker": {"color": "tomato"},
            }
        ],
        "layout": {
            "template": TEMPLATE,
            "title": {"text": format!("{} Earnings Surprises", symbol), "x": 0.5},
            "xaxis": {"title": {"text": "Quarter"}},
            "yaxis": {"title": {"text": "Value (USD)"}},
            "font": {"size": 15},
        }
    })
}

/// The quote row rendered as a table figure.
pub fn quote_table(symbol: &str, quote: &Table) -> Value {
    let values: Vec<Value> = quote
        .rows()
        .first()
        .map(|row| row.cells.iter().map(|c| json!([cell_json(c)])).collect())
        .unwrap_or_default();

    json!({
        "data": [{
            "type": "table",
            "header": {
                "values": quote.columns(),
                "align": "center",
                "line": {"color": "black"},
                "fill": {"color": "ivory"},
            },
            "cells": {
                "values": values,
                "align": "center",
                "line": {"color": "black"},
                "fill": {"color": "cyan"},
            },
        }],
        "layout": {
            "template": TEMPLATE,
            "width": 1669,
            "height": 400,
            "title": {"text": format!("{} Current Quote", symbol), "x": 0.5, "font": {"color": "white", "size": 22}},
            "font": {"size": 20, "color": "black"},
        }
    })
}

/// Candlestick chart with a volume subplot underneath (80/20 split, shared x axis).
pub fn candlestick(symbol: &str, timeframe: &str, candles: &Table) -> Value {
    let x = candles.index();
    json!({
        "data": [
            {
                "type": "candlestick",
                "name": "Candles",
                "x": x,
                "open": numeric(candles, "Open"),
                "high": numeric(candles, "High"),
                "low": numeric(candles, "Low"),
                "close": numeric(candles, "Close"),
                "increasing": {"line": {"color": "limegreen"}},
                "decreasing": {"line": {"color": "orangered"}},
                "xaxis": "x",
                "yaxis": "y",
            },
            {
                "type": "bar",
                "name": "Volume",
                "x": x,
                "y": numeric(candles, "Volume"),
                "marker": {"color": "aqua"},
                "xaxis": "x2",
                "yaxis": "y2",
            }
        ],
        "layout": {
            "template": TEMPLATE,
            "title": {"text": format!("{} {} Candlestick Chart with Volume", symbol, timeframe), "x": 0.5},
            "height": 800,
            "font": {"size": 15},
            "xaxis": {"anchor": "y", "domain": [0.0, 1.0], "matches": "x2", "showticklabels": false, "rangeslider": {"visible": false}},
            "xaxis2": {"anchor": "y2", "domain": [0.0, 1.0], "title": {"text": "Datetime Range"}, "rangeslider": {"visible": true}},
            "yaxis": {"anchor": "x", "domain": [0.22, 1.0], "title": {"text": "Stock Price (USD)"}},
            "yaxis2": {"anchor": "x2", "domain": [0.0, 0.2], "title": {"text": "Volume (M)"}},
        }
    })
}

/// Bar chart of one metric across fiscal periods. `None` when the table has no such column.
pub fn period_bar(symbol: &str, period: &str, metric: &str, series: &Table, color: &str) -> Option<Value> {
    let y = series.numeric_column(metric)?;
    Some(json!({
        "data": [{
            "type": "bar",
            "x": series.index(),
            "y": y,
            "marker": {"color": color},
        }],
        "layout": {
            "template": TEMPLATE,
            "title": {"text": format!("{} {} {}", symbol, period, metric), "x": 0.5},
            "xaxis": {"title": {"text": "Period"}},
            "font": {"size": 15},
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_common::markets::finnhub::table::TableBuilder;

    fn metrics() -> Vec<(String, MetricValue)> {
        vec![
            ("10DayAverageTradingVolume".into(), MetricValue::Number(52.1)),
            ("52WeekHigh".into(), MetricValue::Number(199.62)),
            ("52WeekHighDate".into(), MetricValue::Text("2023-12-14".into())),
            ("52WeekLow".into(), MetricValue::Number(124.17)),
            ("52WeekLowDate".into(), MetricValue::Text("2023-01-03".into())),
            ("beta".into(), MetricValue::Number(1.29)),
        ]
    }

    #[test]
    fn overview_normalises_and_annotates_dates() {
        let fig = metrics_overview("AAPL", &metrics());
        let y: Vec<&str> = fig["data"][0]["y"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(
            y,
            [
                "10DayAverageTradingVolume ",
                "52WeekHigh (Divided by 10)",
                "52WeekLow (Divided by 10)",
                "beta (Multiplied by 10)",
            ]
        );
        assert_eq!(fig["data"][0]["x"][1], 19.962);
        assert_eq!(fig["data"][0]["x"][3], 12.9);

        let notes = fig["layout"]["annotations"].as_array().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0]["text"], "2023-12-14");
        assert_eq!(notes[0]["y"], "52WeekHigh (Divided by 10)");
        assert!((notes[1]["x"].as_f64().unwrap() - 22.417).abs() < 1e-9);
    }

    #[test]
    fn earnings_labels_combine_quarter_and_period() {
        let mut b = TableBuilder::new("Period", ["Actual", "Estimate", "Quarter"]);
        b.push("2023-12-31", vec![2.18.into(), 2.1.into(), Cell::Integer(1)]);
        b.push("2023-09-30", vec![1.46.into(), 1.39.into(), Cell::Integer(4)]);
        let fig = earnings_surprises("AAPL", &b.build_sorted());

        assert_eq!(fig["data"][0]["x"], json!(["4  (2023-09-30)", "1  (2023-12-31)"]));
        assert_eq!(fig["data"][0]["y"], json!([1.39, 2.1]));
        assert_eq!(fig["data"][1]["name"], "Actual");
        assert_eq!(fig["data"][1]["marker"]["color"], "tomato");
    }

    #[test]
    fn quote_table_has_one_column_per_field() {
        let mut b = TableBuilder::new("", ["Current price", "Time"]);
        b.push("Value", vec![189.5.into(), "2023-11-14 22:13".into()]);
        let fig = quote_table("AAPL", &b.build());
        assert_eq!(fig["data"][0]["header"]["values"], json!(["Current price", "Time"]));
        assert_eq!(fig["data"][0]["cells"]["values"], json!([[189.5], ["2023-11-14 22:13"]]));
    }

    #[test]
    fn candlestick_has_volume_subplot() {
        let mut b = TableBuilder::new("Datetime", ["Close", "High", "Low", "Open", "Status", "Volume"]);
        b.push("2024-01-02 00:00:00", vec![1.0.into(), 2.0.into(), 0.5.into(), 1.5.into(), "ok".into(), 100.0.into()]);
        let fig = candlestick("AAPL", "Three years to date (Daily)", &b.build_sorted());

        assert_eq!(fig["data"][0]["type"], "candlestick");
        assert_eq!(fig["data"][0]["close"], json!([1.0]));
        assert_eq!(fig["data"][1]["yaxis"], "y2");
        assert_eq!(fig["layout"]["yaxis"]["domain"], json!([0.22, 1.0]));
        assert_eq!(
            fig["layout"]["title"]["text"],
            "AAPL Three years to date (Daily) Candlestick Chart with Volume"
        );
    }

    #[test]
    fn period_bar_for_known_and_unknown_metric() {
        let mut b = TableBuilder::new("Datetime", ["Book Value (USD)"]);
        b.push("2022-09-30", vec![50672.0.into()]);
        b.push("2023-09-30", vec![Cell::Null]);
        let t = b.build_sorted();

        let fig = period_bar("AAPL", "Annual", "Book Value (USD)", &t, "lightgreen").unwrap();
        assert_eq!(fig["data"][0]["y"], json!([50672.0, null]));
        assert_eq!(fig["layout"]["title"]["text"], "AAPL Annual Book Value (USD)");
        assert!(period_bar("AAPL", "Annual", "Cash Ratio", &t, "lightgreen").is_none());
    }
}
