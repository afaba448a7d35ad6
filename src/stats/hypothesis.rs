//! Paired two-sample tests
//!
//! Both tests take the two conditions of a crossover study as matched samples,
//! `x[i]` and `y[i]` belonging to the same subject, and test the differences
//! `x[i] - y[i]` against zero (two-sided).

use super::error::StatsError;
use super::{normal_cdf, t_quantile};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Largest number of non-zero differences for the exact Wilcoxon distribution
pub const WILCOXON_EXACT_LIMIT: usize = 50;

// ============================================================================
// Paired t-test
// ============================================================================

/// Result of a paired t-test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTTest {
    pub n: usize,
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
    /// Mean of `x - y`
    pub mean_difference: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub level: f64,
}

/// Paired t-test on `x - y` with a `level` confidence interval of the mean difference
pub fn paired_t_test(x: &[f64], y: &[f64], level: f64) -> Result<PairedTTest, StatsError> {
    if !(level > 0.0 && level < 1.0) {
        return Err(StatsError::invalid("level", level));
    }
    let diffs = differences(x, y)?;
    let n = diffs.len();
    if n < 2 {
        return Err(StatsError::InsufficientData { n, required: 2 });
    }

    let mean = diffs.iter().mean();
    let sd = diffs.iter().std_dev();
    let se = sd / (n as f64).sqrt();
    if se < 10.0 * f64::EPSILON * mean.abs() || se == 0.0 {
        return Err(StatsError::ConstantData);
    }

    let df = (n - 1) as f64;
    let statistic = mean / se;
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = (2.0 * dist.sf(statistic.abs())).min(1.0);
    let t_crit = t_quantile(1.0 - (1.0 - level) / 2.0, df)?;

    Ok(PairedTTest {
        n,
        statistic,
        df,
        p_value,
        mean_difference: mean,
        ci_lower: mean - t_crit * se,
        ci_upper: mean + t_crit * se,
        level,
    })
}

// ============================================================================
// Wilcoxon signed-rank test
// ============================================================================

/// How the Wilcoxon p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WilcoxonMethod {
    /// Exact null distribution of V
    Exact,
    /// Normal approximation with continuity and tie correction
    NormalApproximation,
}

/// Result of a Wilcoxon signed-rank test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WilcoxonTest {
    /// Number of non-zero differences
    pub n: usize,
    /// Sum of the ranks of the positive differences (V)
    pub statistic: f64,
    pub p_value: f64,
    pub method: WilcoxonMethod,
    /// Zero differences dropped before ranking
    pub zeros: usize,
    pub ties: bool,
}

/// Wilcoxon signed-rank test on `x - y`
///
/// Zero differences are dropped and tied absolute differences get average
/// ranks. With fewer than [WILCOXON_EXACT_LIMIT] differences and neither ties
/// nor zeros the p-value is exact, otherwise the normal approximation is used.
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> Result<WilcoxonTest, StatsError> {
    let all = differences(x, y)?;
    let diffs: Vec<f64> = all.iter().copied().filter(|d| *d != 0.0).collect();
    let zeros = all.len() - diffs.len();
    let n = diffs.len();
    if n == 0 {
        return Err(StatsError::InsufficientData { n, required: 1 });
    }

    let (ranks, tie_sizes) = average_ranks(&diffs);
    let statistic: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();
    let ties = tie_sizes.iter().any(|t| *t > 1);

    let nf = n as f64;
    let expected = nf * (nf + 1.0) / 4.0;

    if n < WILCOXON_EXACT_LIMIT && !ties && zeros == 0 {
        let v = statistic.round() as usize;
        let p = if statistic > expected {
            // P(V >= v)
            1.0 - signrank_cdf(v - 1, n)
        } else {
            signrank_cdf(v, n)
        };
        return Ok(WilcoxonTest {
            n,
            statistic,
            p_value: (2.0 * p).min(1.0),
            method: WilcoxonMethod::Exact,
            zeros,
            ties,
        });
    }

    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let sigma = (nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_term / 48.0).sqrt();
    if sigma <= 0.0 {
        return Err(StatsError::ConstantData);
    }
    let shift = statistic - expected;
    let z = (shift - 0.5 * shift.signum()) / sigma;
    let p_value = (2.0 * normal_cdf(z).min(normal_cdf(-z))).min(1.0);

    Ok(WilcoxonTest {
        n,
        statistic,
        p_value,
        method: WilcoxonMethod::NormalApproximation,
        zeros,
        ties,
    })
}

// ============================================================================
// Internal helpers
// ============================================================================

fn differences(x: &[f64], y: &[f64]) -> Result<Vec<f64>, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::invalid(
            "y.len()",
            format!("{} (x has {})", y.len(), x.len()),
        ));
    }
    if x.is_empty() {
        return Err(StatsError::Empty);
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    Ok(x.iter().zip(y).map(|(a, b)| a - b).collect())
}

/// Ranks of `|d|` (1-based, ties averaged) and the sizes of each tie group
fn average_ranks(diffs: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..diffs.len()).collect();
    order.sort_by(|&a, &b| diffs[a].abs().total_cmp(&diffs[b].abs()));

    let mut ranks = vec![0.0; diffs.len()];
    let mut tie_sizes = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let value = diffs[order[start]].abs();
        let mut end = start + 1;
        while end < order.len() && diffs[order[end]].abs() == value {
            end += 1;
        }
        // Positions start..end share the mean of ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        tie_sizes.push(end - start);
        start = end;
    }
    (ranks, tie_sizes)
}

/// P(V <= v) under the null for `n` untied differences
///
/// Counts the subsets of {1..n} by rank sum.
fn signrank_cdf(v: usize, n: usize) -> f64 {
    let max = n * (n + 1) / 2;
    let mut counts = vec![0.0_f64; max + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        let top = k * (k + 1) / 2;
        for s in (k..=top).rev() {
            counts[s] += counts[s - k];
        }
    }
    let total = 2.0_f64.powi(n as i32);
    counts.iter().take(v.min(max) + 1).sum::<f64>() / total
}
