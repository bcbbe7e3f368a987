//! Candle request parameters: resolution and the unix time range.

use super::error::{FinnhubError, FinnhubResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// Default time of day when a candle range is given by date only.
pub const DEFAULT_TIME: &str = "00:00:00";

/// Candle bucket size. Not every exchange offers every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 1 minute.
    Min1,
    /// 5 minutes.
    Min5,
    /// 15 minutes.
    Min15,
    /// 30 minutes.
    Min30,
    /// 60 minutes.
    Min60,
    /// Daily.
    Day,
    /// Weekly.
    Week,
    /// Monthly.
    Month,
}

impl Resolution {
    /// All resolutions, shortest first.
    pub const ALL: [Resolution; 8] = [
        Resolution::Min1,
        Resolution::Min5,
        Resolution::Min15,
        Resolution::Min30,
        Resolution::Min60,
        Resolution::Day,
        Resolution::Week,
        Resolution::Month,
    ];

    /// The value of the `resolution` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Min1 => "1",
            Resolution::Min5 => "5",
            Resolution::Min15 => "15",
            Resolution::Min30 => "30",
            Resolution::Min60 => "60",
            Resolution::Day => "D",
            Resolution::Week => "W",
            Resolution::Month => "M",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = FinnhubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resolution::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                FinnhubError::InvalidInput(format!(
                    "unsupported resolution '{}', expected one of 1, 5, 15, 30, 60, D, W, M",
                    s
                ))
            })
    }
}

/// Converts a `yyyy-mm-dd` date and `HH:MM:SS` time, read as UTC, into a unix timestamp.
pub fn convert_to_unix(date: &str, time: &str) -> FinnhubResult<i64> {
    let d = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| FinnhubError::InvalidInput(format!("date '{}': {}", date, e)))?;
    let t = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .map_err(|e| FinnhubError::InvalidInput(format!("time '{}': {}", time, e)))?;
    Ok(NaiveDateTime::new(d, t).and_utc().timestamp())
}

/// Formats a unix timestamp (UTC) with the given `strftime` pattern.
pub fn format_unix(ts: i64, fmt: &str) -> FinnhubResult<String> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format(fmt).to_string())
        .ok_or_else(|| FinnhubError::InvalidInput(format!("timestamp {} out of range", ts)))
}

/// An inclusive `[from, to]` request window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRange {
    /// Human readable start, kept for error messages.
    pub label_from: String,
    /// Human readable end.
    pub label_to: String,
    /// Start as unix seconds.
    pub from: i64,
    /// End as unix seconds.
    pub to: i64,
}

impl CandleRange {
    /// Parses dates (`yyyy-mm-dd`) and optional times (`HH:MM:SS`, default `00:00:00`).
    pub fn parse(
        date_from: &str,
        date_to: &str,
        time_from: Option<&str>,
        time_to: Option<&str>,
    ) -> FinnhubResult<Self> {
        let time_from = time_from.unwrap_or(DEFAULT_TIME);
        let time_to = time_to.unwrap_or(DEFAULT_TIME);
        let from = convert_to_unix(date_from, time_from)?;
        let to = convert_to_unix(date_to, time_to)?;
        if from > to {
            return Err(FinnhubError::InvalidInput(format!(
                "range start {} {} is after end {} {}",
                date_from, time_from, date_to, time_to
            )));
        }
        Ok(Self {
            label_from: format!("{} {}", date_from.trim(), time_from.trim()),
            label_to: format!("{} {}", date_to.trim(), time_to.trim()),
            from,
            to,
        })
    }

    /// Whole-day range between two dates.
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> FinnhubResult<Self> {
        Self::parse(
            &from.format("%Y-%m-%d").to_string(),
            &to.format("%Y-%m-%d").to_string(),
            None,
            None,
        )
    }
}
