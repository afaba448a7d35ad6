//! Descriptive summaries reported in the summary table
//!
//! Quantiles interpolate linearly between order statistics (Hyndman & Fan type 7,
//! the default of R and NumPy): for sorted values `x` and probability `p` the
//! position is `h = (n - 1) p`.

use super::error::StatsError;
use super::t_quantile;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::fmt;

// ============================================================================
// Types
// ============================================================================

/// Geometric mean with a confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometricMeanCI {
    pub n: usize,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    /// Confidence level, e.g. 0.95
    pub level: f64,
}

impl fmt::Display for GeometricMeanCI {
    /// `mean (lower-upper)` with two decimals
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ({:.2}-{:.2})", self.mean, self.lower, self.upper)
    }
}

/// Median with first and third quartiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MedianIQR {
    pub n: usize,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl fmt::Display for MedianIQR {
    /// `median (Q1-Q3)` with two decimals
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ({:.2}-{:.2})", self.median, self.q1, self.q3)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Type 7 sample quantile of `values` at probability `p`
pub fn quantile(values: &[f64], p: f64) -> Result<f64, StatsError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::invalid("p", p));
    }
    let sorted = sorted_finite(values)?;
    Ok(quantile_sorted(&sorted, p))
}

/// Median and interquartile range
pub fn median_iqr(values: &[f64]) -> Result<MedianIQR, StatsError> {
    let sorted = sorted_finite(values)?;
    Ok(MedianIQR {
        n: sorted.len(),
        median: quantile_sorted(&sorted, 0.5),
        q1: quantile_sorted(&sorted, 0.25),
        q3: quantile_sorted(&sorted, 0.75),
    })
}

/// Geometric mean and its Student-t confidence interval
///
/// The interval is computed on the log scale, mean ± t(1-α/2, n-1) · SE, and
/// back-transformed. Zero or negative values are rejected rather than skipped.
///
/// ```
/// use crossnca::stats::geometric_mean_ci;
///
/// let gm = geometric_mean_ci(&[1.0, 2.0, 4.0, 8.0], 0.95).unwrap();
/// assert!((gm.mean - 8.0_f64.sqrt()).abs() < 1e-12);
/// assert_eq!(gm.to_string(), "2.83 (0.68-11.75)");
/// ```
pub fn geometric_mean_ci(values: &[f64], level: f64) -> Result<GeometricMeanCI, StatsError> {
    if !(level > 0.0 && level < 1.0) {
        return Err(StatsError::invalid("level", level));
    }
    check_finite(values)?;
    if let Some(&value) = values.iter().find(|v| **v <= 0.0) {
        return Err(StatsError::NonPositive { value });
    }

    let n = values.len();
    if n < 2 {
        return Err(StatsError::InsufficientData { n, required: 2 });
    }

    let logs: Vec<f64> = values.iter().map(|v| v.ln()).collect();
    let log_mean = logs.iter().mean();
    let se = logs.iter().std_dev() / (n as f64).sqrt();
    let t_crit = t_quantile(1.0 - (1.0 - level) / 2.0, (n - 1) as f64)?;

    Ok(GeometricMeanCI {
        n,
        mean: log_mean.exp(),
        lower: (log_mean - t_crit * se).exp(),
        upper: (log_mean + t_crit * se).exp(),
        level,
    })
}

/// `"median (Q1-Q3)"` of the values
pub fn format_median_iqr(values: &[f64]) -> Result<String, StatsError> {
    median_iqr(values).map(|m| m.to_string())
}

/// `"mean (lower-upper)"` of the geometric mean and its confidence interval
pub fn format_geometric_mean_ci(values: &[f64], level: f64) -> Result<String, StatsError> {
    geometric_mean_ci(values, level).map(|g| g.to_string())
}

// ============================================================================
// Internal helpers
// ============================================================================

fn check_finite(values: &[f64]) -> Result<(), StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    Ok(())
}

fn sorted_finite(values: &[f64]) -> Result<Vec<f64>, StatsError> {
    check_finite(values)?;
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(sorted)
}

/// `sorted` must be non-empty and ascending
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
