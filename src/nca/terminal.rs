//! Terminal phase analysis: λz (lambda_z) and half-life estimation
//!
//! # Algorithm: Curve Stripping
//!
//! 1. **Point Selection**: Start from Tlast and work backwards
//!    - Minimum 3 points (configurable)
//!    - Exclude Tmax by default (configurable)
//!    - Only positive concentrations enter the regression
//!
//! 2. **Regression**: Fit ln(C) vs time using ordinary least squares
//!    - λz = -slope
//!    - Must have λz > 0
//!
//! 3. **Best Fit Selection**: Among all fits passing R² and span ratio checks,
//!    maximise adjusted R² + factor × n (PKNCA scoring)

use super::types::{LambdaZOptions, RegressionStats};

/// Estimate λz using log-linear regression on the terminal phase
///
/// # Arguments
///
/// * `times` - Time points (must be sorted in ascending order)
/// * `concentrations` - Concentration values at each time point
/// * `tmax_idx` - Index of Tmax (excluded from regression unless `include_tmax`)
/// * `tlast_idx` - Index of Tlast (last point to include)
/// * `options` - Configuration options for the calculation
///
/// # Returns
///
/// `Some(RegressionStats)` if a valid regression is found, `None` otherwise.
///
/// # Examples
///
/// ```rust
/// use crossnca::nca::{lambda_z, LambdaZOptions};
///
/// let times = vec![0.0, 1.0, 2.0, 4.0, 8.0, 12.0, 24.0];
/// let concs = vec![0.0, 10.0, 8.0, 5.0, 2.5, 1.2, 0.3];
///
/// let options = LambdaZOptions::default();
/// if let Some(fit) = lambda_z(&times, &concs, 1, 6, &options) {
///     println!("λz = {:.4} h⁻¹", fit.lambda_z);
/// }
/// ```
pub fn lambda_z(
    times: &[f64],
    concentrations: &[f64],
    tmax_idx: usize,
    tlast_idx: usize,
    options: &LambdaZOptions,
) -> Option<RegressionStats> {
    if times.len() != concentrations.len() || tlast_idx >= times.len() || options.min_points < 2
    {
        return None;
    }

    let start_idx = if options.include_tmax {
        0
    } else {
        tmax_idx + 1
    };

    // Need at least min_points between start and tlast
    if tlast_idx + 1 < start_idx + options.min_points {
        return None;
    }

    let available = tlast_idx + 1 - start_idx;
    let max_n = options
        .max_points
        .map_or(available, |max| available.min(max));

    let mut best: Option<(f64, RegressionStats)> = None;

    for n_points in options.min_points..=max_n {
        let first_idx = tlast_idx + 1 - n_points;

        let Some(fit) = fit_window(times, concentrations, first_idx, tlast_idx, options.min_points)
        else {
            continue;
        };

        if fit.r_squared < options.min_r_squared || fit.span_ratio < options.min_span_ratio {
            continue;
        }

        let score = fit.adj_r_squared + options.adj_r_squared_factor * fit.n_points as f64;
        if best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((score, fit));
        }
    }

    best.map(|(_, fit)| fit)
}

/// Calculate λz with automatic Tmax and Tlast detection
pub fn lambda_z_auto(
    times: &[f64],
    concentrations: &[f64],
    options: &LambdaZOptions,
) -> Option<RegressionStats> {
    if times.is_empty() || times.len() != concentrations.len() {
        return None;
    }

    // First occurrence of the maximum
    let tmax_idx = concentrations
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(mi, mc), (i, &c)| {
            if c > mc {
                (i, c)
            } else {
                (mi, mc)
            }
        })
        .0;
    let tlast_idx = concentrations.iter().rposition(|&c| c > 0.0)?;

    lambda_z(times, concentrations, tmax_idx, tlast_idx, options)
}

/// Fit ln(C) against time on `first_idx..=last_idx`
fn fit_window(
    times: &[f64],
    concentrations: &[f64],
    first_idx: usize,
    last_idx: usize,
    min_points: usize,
) -> Option<RegressionStats> {
    let (x, y): (Vec<f64>, Vec<f64>) = (first_idx..=last_idx)
        .filter(|&i| concentrations[i] > 0.0)
        .map(|i| (times[i], concentrations[i].ln()))
        .unzip();

    if x.len() < min_points.max(3) {
        return None;
    }

    let (slope, intercept, r_squared) = linear_regression(&x, &y)?;
    let lambda_z = -slope;
    if lambda_z <= 0.0 {
        return None;
    }

    let n = x.len() as f64;
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1.0) / (n - 2.0);
    let time_first = x[0];
    let time_last = x[x.len() - 1];

    Some(RegressionStats {
        lambda_z,
        intercept,
        r_squared,
        adj_r_squared,
        n_points: x.len(),
        time_first,
        time_last,
        span_ratio: (time_last - time_first) / half_life(lambda_z),
    })
}

/// Simple linear regression: y = a + b*x
///
/// Returns (slope, intercept, r_squared)
fn linear_regression(x: &[f64], y: &[f64]) -> Option<(f64, f64, f64)> {
    let n = x.len() as f64;
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(xi, yi)| xi * yi).sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();
    let sum_y2: f64 = y.iter().map(|yi| yi * yi).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < 1e-15 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let ss_tot = sum_y2 - sum_y * sum_y / n;
    let ss_res: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
        .sum();

    let r_squared = if ss_tot.abs() < 1e-15 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Some((slope, intercept, r_squared))
}

// ============================================================================
// Derived Parameters
// ============================================================================

/// Terminal half-life: ln(2) / λz
#[inline]
pub fn half_life(lambda_z: f64) -> f64 {
    std::f64::consts::LN_2 / lambda_z
}

/// AUC extrapolated to infinity: AUClast + Clast / λz
#[inline]
pub fn auc_inf(auc_last: f64, clast: f64, lambda_z: f64) -> f64 {
    if lambda_z <= 0.0 {
        return f64::NAN;
    }
    auc_last + clast / lambda_z
}

/// Percentage of AUCinf that is extrapolated
#[inline]
pub fn auc_extrap_pct(auc_last: f64, auc_inf: f64) -> f64 {
    if auc_inf <= 0.0 || !auc_inf.is_finite() {
        return f64::NAN;
    }
    (auc_inf - auc_last) / auc_inf * 100.0
}

/// Apparent clearance: Dose / AUCinf
#[inline]
pub fn clearance(dose: f64, auc_inf: f64) -> f64 {
    if auc_inf <= 0.0 || !auc_inf.is_finite() {
        return f64::NAN;
    }
    dose / auc_inf
}
