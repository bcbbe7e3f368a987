//! Everything the dashboard charts, fetched once at startup.

use chrono::{Datelike, Days, Months, NaiveDate};
use lib_common::markets::finnhub::{CandleRange, FinnhubConnector, FinnhubResult, Resolution, Table};
use lib_common::transforms::normalize::MetricValue;

/// Metric code to display label for the annual/quarterly series.
pub const METRIC_LABELS: [(&str, &str); 32] = [
    ("bookValue", "Book Value (USD)"),
    ("cashRatio", "Cash Ratio"),
    ("currentRatio", "Current Ratio"),
    ("ebitPerShare", "EBIT per Share (USD)"),
    ("eps", "Earnings per Share (USD)"),
    ("ev", "Embedded Value (USD)"),
    ("fcfMargin", "Free Cash Flow Margin (USD)"),
    ("fcfPerShareTTM", "Free Cash Flow Per Share (USD)"),
    ("grossMargin", "Gross Margin (%)"),
    ("longtermDebtTotalAsset", "Long Term Debt Total Asset (%)"),
    ("longtermDebtTotalCapital", "Long Term Debt Total Capital (USD)"),
    ("longtermDebtTotalEquity", "Long Term Debt Total Equity (USD)"),
    ("netDebtToTotalCapital", "Net Debt to Total Capital"),
    ("netDebtToTotalEquity", "Net Debt to Total Equity"),
    ("netMargin", "Net Margin (%)"),
    ("operatingMargin", "Operating Margin (%)"),
    ("pb", "Price-to-Book Ratio"),
    ("peTTM", "Price to Earnings TTM"),
    ("pfcfTTM", "Price to Free Cash Flow TTM"),
    ("pretaxMargin", "Pre-tax Margin (USD)"),
    ("psTTM", "Price to Sales TTM"),
    ("quickRatio", "Quick Ratio"),
    ("roaTTM", "Return on Assets (USD)"),
    ("roeTTM", "Return on Equity (USD)"),
    ("roicTTM", "Return on Invested Capital (USD)"),
    ("rotcTTM", "Return on Traded Capital (USD)"),
    ("salesPerShare", "Sales per Share"),
    ("sgaToSale", "SG&A to Sale"),
    ("totalDebtToEquity", "Total Debt to Equity"),
    ("totalDebtToTotalAsset", "Total Debt to Total Asset"),
    ("totalDebtToTotalCapital", "Total Debt to Total Capital"),
    ("totalRatio", "Total Ratio"),
];

pub fn metric_label(code: &str) -> Option<&'static str> {
    METRIC_LABELS.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
}

/// The candlestick views offered by the timeframe dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    ThreeYears,
    OneMonth,
    OneWeek,
    LastTradingDay,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::ThreeYears,
        Timeframe::OneMonth,
        Timeframe::OneWeek,
        Timeframe::LastTradingDay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::ThreeYears => "Three years to date (Daily)",
            Timeframe::OneMonth => "One month to date (15 min)",
            Timeframe::OneWeek => "One week to date (5 min)",
            Timeframe::LastTradingDay => "Last trading day (1 min)",
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Timeframe::ThreeYears => Resolution::Day,
            Timeframe::OneMonth => Resolution::Min15,
            Timeframe::OneWeek => Resolution::Min5,
            Timeframe::LastTradingDay => Resolution::Min1,
        }
    }

    /// First day of the window ending `today`.
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            Timeframe::ThreeYears => today.checked_sub_months(Months::new(36)),
            Timeframe::OneMonth => today.checked_sub_months(Months::new(1)),
            Timeframe::OneWeek => today.checked_sub_days(Days::new(7)),
            Timeframe::LastTradingDay => today.checked_sub_days(Days::new(last_trading_day_offset(today))),
        };
        start.unwrap_or(NaiveDate::MIN)
    }

    pub fn range(&self, today: NaiveDate) -> FinnhubResult<CandleRange> {
        CandleRange::from_dates(self.start(today), today)
    }

    pub fn from_label(label: &str) -> Option<Timeframe> {
        Timeframe::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// Days back to the previous trading day; Saturday, Sunday and Monday all land on Friday.
fn last_trading_day_offset(today: NaiveDate) -> u64 {
    let weekday = i64::from(today.weekday().num_days_from_monday());
    ((weekday + 6) % 7 - 3).max(1) as u64
}

/// Immutable snapshot shared by every request handler.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub symbol: String,
    pub annual: Table,
    pub quarterly: Table,
    pub metrics: Vec<(String, MetricValue)>,
    pub earnings: Table,
    pub quote: Table,
    pub candles: Vec<(Timeframe, Table)>,
}

impl DashboardData {
    /// Fetches every table the page needs. Any upstream failure aborts startup.
    pub async fn load(connector: &FinnhubConnector, symbol: &str, today: NaiveDate) -> FinnhubResult<Self> {
        log::info!("Loading dashboard data for {}", symbol);
        let financials = connector.basic_financials(symbol).await?;
        let earnings = connector.earnings_surprises(symbol).await?;
        let quote = connector.current_quote(symbol).await?;

        let mut candles = Vec::with_capacity(Timeframe::ALL.len());
        for timeframe in Timeframe::ALL {
            let range = timeframe.range(today)?;
            log::info!("Fetching {} candles from {} to {}", timeframe.label(), range.label_from, range.label_to);
            let table = connector.stock_candles(symbol, timeframe.resolution(), &range).await?;
            candles.push((timeframe, table));
        }

        Ok(Self::from_tables(
            symbol,
            financials.annual,
            financials.quarterly,
            financials.metrics,
            earnings,
            quote,
            candles,
        ))
    }

    /// Assembles the snapshot, relabelling the metric series columns.
    pub fn from_tables(
        symbol: &str,
        annual: Table,
        quarterly: Table,
        metrics: Vec<(String, MetricValue)>,
        earnings: Table,
        quote: Table,
        candles: Vec<(Timeframe, Table)>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            annual: annual.relabeled(|c| metric_label(c)),
            quarterly: quarterly.relabeled(|c| metric_label(c)),
            metrics,
            earnings,
            quote,
            candles,
        }
    }

    pub fn candles_for(&self, timeframe: Timeframe) -> Option<&Table> {
        self.candles.iter().find(|(t, _)| *t == timeframe).map(|(_, table)| table)
    }

    /// Dropdown options for one series table: known labels first, in label-map order.
    pub fn metric_options(table: &Table) -> Vec<&'static str> {
        METRIC_LABELS
            .iter()
            .map(|(_, label)| *label)
            .filter(|label| table.column_position(label).is_some())
            .collect()
    }
}
