//! # Table Model
//!
//! The tabular form every connector operation returns: an index column, a
//! fixed list of human readable column labels and rows of cells. Tables are
//! built once through [`TableBuilder`] and are read-only afterwards; the
//! presentation layer takes projections (`column`, `numeric_column`,
//! `index`) and never mutates the source.

use serde::Serialize;
use std::fmt;

/// One cell of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Floating point value.
    Number(f64),
    /// Integer value (ids, volumes, years).
    Integer(i64),
    /// Free text.
    Text(String),
    /// Missing value.
    Null,
}

impl Cell {
    /// Numeric view, `None` for text and null.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text view, `None` for anything but text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Text(s) => f.write_str(s),
            Cell::Null => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// A row: index key plus one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Index value (timestamp, period or position).
    pub key: String,
    /// Cells in column order.
    pub cells: Vec<Cell>,
}

/// Immutable labelled table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    index_name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Name of the index column (e.g. `Datetime`).
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Column labels.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index keys in row order.
    pub fn index(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.key.as_str()).collect()
    }

    /// Position of a column label.
    pub fn column_position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Borrowed cells of one column.
    pub fn column(&self, label: &str) -> Option<Vec<&Cell>> {
        let pos = self.column_position(label)?;
        Some(self.rows.iter().map(|r| &r.cells[pos]).collect())
    }

    /// One column as numbers; non-numeric cells become `None`.
    pub fn numeric_column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        self.column(label)
            .map(|cells| cells.into_iter().map(Cell::as_f64).collect())
    }

    /// Cell lookup by index key and column label.
    pub fn get(&self, key: &str, label: &str) -> Option<&Cell> {
        let pos = self.column_position(label)?;
        self.rows.iter().find(|r| r.key == key).map(|r| &r.cells[pos])
    }

    /// Returns a copy with columns renamed through `rename`. The source is left as is.
    pub fn relabeled<F>(&self, rename: F) -> Table
    where
        F: Fn(&str) -> Option<&str>,
    {
        Table {
            index_name: self.index_name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| rename(c).map(str::to_string).unwrap_or_else(|| c.clone()))
                .collect(),
            rows: self.rows.clone(),
        }
    }
}

/// Accumulates rows, then sorts and freezes them into a [`Table`].
#[derive(Debug)]
pub struct TableBuilder {
    index_name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableBuilder {
    /// Starts a table with a fixed set of column labels.
    pub fn new<S: Into<String>>(index_name: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            index_name: index_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with `Null`, long rows truncated.
    pub fn push(&mut self, key: impl Into<String>, mut cells: Vec<Cell>) -> &mut Self {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(Row { key: key.into(), cells });
        self
    }

    /// Freezes rows in insertion order.
    pub fn build(self) -> Table {
        Table {
            index_name: self.index_name,
            columns: self.columns,
            rows: self.rows,
        }
    }

    /// Freezes rows sorted ascending by index key (stable).
    ///
    /// Keys are ISO-style timestamps or fiscal periods, so lexical order is chronological.
    pub fn build_sorted(mut self) -> Table {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
        self.build()
    }

    /// Freezes rows sorted by one column's text, re-keyed by position `0..n`.
    pub fn build_sorted_by_column(mut self, label: &str) -> Table {
        if let Some(pos) = self.columns.iter().position(|c| c == label) {
            self.rows.sort_by(|a, b| a.cells[pos].to_string().cmp(&b.cells[pos].to_string()));
        }
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.key = i.to_string();
        }
        self.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut b = TableBuilder::new("Datetime", ["Close", "Status"]);
        b.push("2024-01-03", vec![3.0.into(), "ok".into()]);
        b.push("2024-01-01", vec![1.0.into(), "ok".into()]);
        b.push("2024-01-02", vec![Cell::Integer(2)]);
        b.build_sorted()
    }

    #[test]
    fn sorted_build_is_chronological() {
        let t = sample();
        assert_eq!(t.index(), ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(t.numeric_column("Close").unwrap(), [Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(t.get("2024-01-02", "Status"), Some(&Cell::Null));
    }

    #[test]
    fn relabel_leaves_source_untouched() {
        let t = sample();
        let r = t.relabeled(|c| if c == "Close" { Some("Closing price") } else { None });
        assert_eq!(r.columns(), ["Closing price", "Status"]);
        assert_eq!(t.columns(), ["Close", "Status"]);
        assert_eq!(r.rows(), t.rows());
    }

    #[test]
    fn column_sort_rekeys_by_position() {
        let mut b = TableBuilder::new("", ["Symbol"]);
        b.push("x", vec!["MSFT".into()]);
        b.push("y", vec!["AAPL".into()]);
        let t = b.build_sorted_by_column("Symbol");
        assert_eq!(t.index(), ["0", "1"]);
        assert_eq!(t.get("0", "Symbol").and_then(Cell::as_str), Some("AAPL"));
    }

    #[test]
    fn unknown_column_is_none() {
        assert!(sample().column("Volume").is_none());
    }
}
