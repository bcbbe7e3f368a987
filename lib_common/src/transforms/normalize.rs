//! # Display Value Normalizer
//!
//! Rescales arbitrary metric values into the chart band so that a single bar
//! chart can show a price-to-book ratio next to an enterprise value in the
//! hundreds of millions. The scale applied is kept as a power of ten so the
//! original magnitude can be read back from the label.
//!
//! ## Band
//! A value is considered in band when neither scaling rule fires:
//! - `x > 100 || x < -100` divides by ten,
//! - `-5 < x < 5` multiplies by ten.
//!
//! The comparisons are strict, so `±5` and `±100` are terminal. Zero and
//! non-finite input are returned untouched.

use serde::Serialize;

/// Upper bound on scaling steps. Subnormal `f64` values need a little over 320.
pub const MAX_STEPS: u32 = 400;

/// Direction of the rescaling applied to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleDirection {
    /// The value was divided by `10^exponent`.
    Divided,
    /// The value was multiplied by `10^exponent`.
    Multiplied,
}

/// Result of normalising one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Normalized {
    /// No scaling was needed (or the value is zero / not finite).
    Unchanged(f64),
    /// The value was rescaled into the band.
    Scaled {
        /// Scaled magnitude, rounded to 3 decimal places.
        value: f64,
        /// Number of factor-of-ten steps applied.
        exponent: u32,
        /// Whether the steps divided or multiplied.
        direction: ScaleDirection,
    },
}

impl Normalized {
    /// The value to plot.
    pub fn value(&self) -> f64 {
        match *self {
            Normalized::Unchanged(v) => v,
            Normalized::Scaled { value, .. } => value,
        }
    }

    /// `10^exponent` as a float, `1.0` when unchanged.
    pub fn factor(&self) -> f64 {
        match *self {
            Normalized::Unchanged(_) => 1.0,
            Normalized::Scaled { exponent, .. } => 10f64.powi(exponent as i32),
        }
    }

    /// Reverses the scaling (within the 3-decimal rounding).
    pub fn original_estimate(&self) -> f64 {
        match *self {
            Normalized::Unchanged(v) => v,
            Normalized::Scaled { value, direction: ScaleDirection::Divided, .. } => value * self.factor(),
            Normalized::Scaled { value, direction: ScaleDirection::Multiplied, .. } => value / self.factor(),
        }
    }

    /// Human readable scale note, e.g. `(Divided by 100000)`. Empty when unchanged.
    pub fn descriptor(&self) -> String {
        match *self {
            Normalized::Unchanged(_) => String::new(),
            Normalized::Scaled { exponent, direction, .. } => {
                let verb = match direction {
                    ScaleDirection::Divided => "Divided",
                    ScaleDirection::Multiplied => "Multiplied",
                };
                format!("({} by {})", verb, power_of_ten(exponent))
            }
        }
    }

    /// True when a scale factor was applied.
    pub fn is_scaled(&self) -> bool {
        matches!(self, Normalized::Scaled { .. })
    }
}

/// `10^exponent` written out as an integer string.
fn power_of_ten(exponent: u32) -> String {
    let mut s = String::with_capacity(exponent as usize + 1);
    s.push('1');
    for _ in 0..exponent {
        s.push('0');
    }
    s
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Normalises a single value into the display band.
///
/// ```
/// use lib_common::transforms::normalize::normalize;
///
/// let n = normalize(3_000_000.0);
/// assert_eq!(n.value(), 30.0);
/// assert_eq!(n.descriptor(), "(Divided by 100000)");
/// ```
pub fn normalize(x: f64) -> Normalized {
    if x == 0.0 || !x.is_finite() {
        return Normalized::Unchanged(x);
    }

    // Net exponent: positive means divided, negative means multiplied.
    let mut net: i64 = 0;
    let mut value = x;
    let mut steps = 0;

    while steps < MAX_STEPS {
        if value > 100.0 || value < -100.0 {
            value /= 10.0;
            net += 1;
        } else if -5.0 < value && value < 5.0 {
            value *= 10.0;
            net -= 1;
        } else {
            break;
        }
        steps += 1;
    }

    match net {
        0 => Normalized::Unchanged(x),
        n if n > 0 => Normalized::Scaled {
            value: round3(value),
            exponent: n as u32,
            direction: ScaleDirection::Divided,
        },
        n => Normalized::Scaled {
            value: round3(value),
            exponent: n.unsigned_abs() as u32,
            direction: ScaleDirection::Multiplied,
        },
    }
}

/// A metric value as reported upstream: numeric or free text (e.g. a date).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Any numeric metric.
    Number(f64),
    /// Non-numeric metric such as `52WeekHighDate`.
    Text(String),
}

/// One metric after column-wise normalisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMetric {
    /// Metric key as reported upstream.
    pub key: String,
    /// The untouched input value.
    pub original: MetricValue,
    /// `None` for text metrics.
    pub normalized: Option<Normalized>,
}

impl NormalizedMetric {
    /// Axis label: the key followed by the scale descriptor.
    pub fn label(&self) -> String {
        let descriptor = self
            .normalized
            .as_ref()
            .map(Normalized::descriptor)
            .unwrap_or_default();
        format!("{} {}", self.key, descriptor)
    }

    /// Bar length for numeric metrics.
    pub fn display_value(&self) -> Option<f64> {
        self.normalized.as_ref().map(Normalized::value)
    }
}

/// Applies [`normalize`] to every numeric metric, keeping the input order.
pub fn normalize_metrics(metrics: &[(String, MetricValue)]) -> Vec<NormalizedMetric> {
    metrics
        .iter()
        .map(|(key, value)| NormalizedMetric {
            key: key.clone(),
            original: value.clone(),
            normalized: match value {
                MetricValue::Number(n) => Some(normalize(*n)),
                MetricValue::Text(_) => None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        let tol = 1e-3 * b.abs().max(1.0);
        assert!((a - b).abs() <= tol, "{} vs {}", a, b);
    }

    #[test]
    fn documented_examples() {
        let n = normalize(250.0);
        assert_eq!(n.value(), 25.0);
        assert_eq!(n.descriptor(), "(Divided by 10)");

        let n = normalize(0.5);
        assert_eq!(n.value(), 5.0);
        assert_eq!(n.descriptor(), "(Multiplied by 10)");

        let n = normalize(3_000_000.0);
        assert_eq!(n.value(), 30.0);
        assert_eq!(n.descriptor(), "(Divided by 100000)");
    }

    #[test]
    fn in_band_values_are_unchanged() {
        for x in [5.0, 5.5, 42.0, 99.99, 100.0, -5.0, -50.0, -100.0] {
            assert_eq!(normalize(x), Normalized::Unchanged(x), "x = {}", x);
        }
    }

    #[test]
    fn zero_and_non_finite_terminate() {
        assert_eq!(normalize(0.0), Normalized::Unchanged(0.0));
        assert_eq!(normalize(-0.0).value(), 0.0);
        assert_eq!(normalize(f64::INFINITY), Normalized::Unchanged(f64::INFINITY));
        assert!(normalize(f64::NAN).value().is_nan());
    }

    #[test]
    fn large_values_recover_magnitude() {
        for x in [101.0, 999.0, 12_345.678, 4.2e8, -250.0, -7.7e6] {
            let n = normalize(x);
            assert!(n.is_scaled());
            if let Normalized::Scaled { exponent, direction, value } = n {
                assert_eq!(direction, ScaleDirection::Divided);
                assert_eq!(n.descriptor(), format!("(Divided by {})", power_of_ten(exponent)));
                assert!(value.abs() <= 100.0 && value.abs() >= 5.0);
            }
            assert_close(n.original_estimate(), x);
        }
    }

    #[test]
    fn small_values_recover_magnitude() {
        for x in [4.99, 0.5, 0.0123, -0.3, 1e-7] {
            let n = normalize(x);
            match n {
                Normalized::Scaled { exponent, direction, .. } => {
                    assert_eq!(direction, ScaleDirection::Multiplied);
                    assert_eq!(n.factor(), 10f64.powi(exponent as i32));
                }
                _ => panic!("{} should be scaled", x),
            }
            let back = n.original_estimate();
            assert!((back - x).abs() <= 1e-3 / n.factor() * 10.0, "{} vs {}", back, x);
        }
    }

    #[test]
    fn multiplier_factor_is_exact() {
        // Four multiplications; a float accumulator would print 9999 here.
        let n = normalize(0.0042);
        assert_eq!(n.descriptor(), "(Multiplied by 10000)");
        assert_eq!(n.value(), 42.0);
    }

    #[test]
    fn subnormal_input_hits_step_cap_without_hanging() {
        let n = normalize(f64::MIN_POSITIVE / 1e10);
        assert!(n.is_scaled());
    }

    #[test]
    fn column_wise_normalisation_keeps_order_and_input() {
        let metrics = vec![
            ("pb".to_string(), MetricValue::Number(2.5)),
            ("52WeekHighDate".to_string(), MetricValue::Text("2024-01-02".into())),
            ("ev".to_string(), MetricValue::Number(250.0)),
            ("beta".to_string(), MetricValue::Number(42.0)),
        ];
        let before = metrics.clone();
        let out = normalize_metrics(&metrics);

        assert_eq!(metrics, before);
        let keys: Vec<&str> = out.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["pb", "52WeekHighDate", "ev", "beta"]);
        assert_eq!(out[0].label(), "pb (Multiplied by 10)");
        assert_eq!(out[1].normalized, None);
        assert_eq!(out[2].display_value(), Some(25.0));
        assert_eq!(out[3].label(), "beta ");
    }
}
