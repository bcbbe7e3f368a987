//! # Transforms Module
//!
//! Pure, display-side transformations applied to connector output before it
//! reaches a chart. Nothing in here touches the network or mutates a table.
//!
//! ## Contained Modules:
//!
//! - **`normalize`**: the power-of-ten value normaliser used by the metrics
//!   overview chart, plus its column-wise helper.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Power-of-ten rescaling of metric values into the chart band.
pub mod normalize;

pub use normalize::{normalize, normalize_metrics, MetricValue, Normalized, NormalizedMetric, ScaleDirection};
