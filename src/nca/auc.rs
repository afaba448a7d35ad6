//! Area Under the Curve (AUC) calculation functions
//!
//! # Methods
//!
//! ## Linear Trapezoidal
//!
//! ```text
//! AUC_segment = (C₁ + C₂) / 2 × (t₂ - t₁)
//! ```
//!
//! ## Linear Up / Log Down
//!
//! - **Linear** for ascending concentrations (absorption phase)
//! - **Log-linear** for descending concentrations (elimination phase)
//!
//! ```text
//! Ascending (C₂ ≥ C₁):   AUC = (C₁ + C₂) / 2 × Δt
//! Descending (C₂ < C₁):  AUC = (C₁ - C₂) × Δt / ln(C₁ / C₂)
//! ```

use super::types::AUCMethod;

/// Check if log-linear method should be used for this segment
#[inline]
fn use_log_linear(c1: f64, c2: f64) -> bool {
    c2 < c1 && c1 > 0.0 && c2 > 0.0 && ((c1 / c2) - 1.0).abs() >= 1e-10
}

/// Calculate AUC for a single segment between two time points
///
/// Returns 0.0 if times are invalid (t2 <= t1).
///
/// # Examples
///
/// ```rust
/// use crossnca::nca::{auc_segment, AUCMethod};
///
/// let auc_lin = auc_segment(0.0, 10.0, 1.0, 8.0, AUCMethod::Linear);
/// assert!((auc_lin - 9.0).abs() < 1e-10);
///
/// // (10 - 8) * 1 / ln(10/8) ≈ 8.96
/// let auc_log = auc_segment(0.0, 10.0, 1.0, 8.0, AUCMethod::LinUpLogDown);
/// assert!(auc_log < auc_lin);
/// ```
#[inline]
pub fn auc_segment(t1: f64, c1: f64, t2: f64, c2: f64, method: AUCMethod) -> f64 {
    let dt = t2 - t1;
    if dt <= 0.0 {
        return 0.0;
    }

    match method {
        AUCMethod::Linear => (c1 + c2) / 2.0 * dt,
        AUCMethod::LinUpLogDown => {
            if use_log_linear(c1, c2) {
                (c1 - c2) * dt / (c1 / c2).ln()
            } else {
                (c1 + c2) / 2.0 * dt
            }
        }
    }
}

/// Calculate AUC from the first time point to `tlast_idx`
///
/// `times` must be sorted ascending and parallel to `concentrations`.
pub fn auc_to_index(
    times: &[f64],
    concentrations: &[f64],
    tlast_idx: usize,
    method: AUCMethod,
) -> f64 {
    (1..=tlast_idx.min(times.len().saturating_sub(1)))
        .map(|i| {
            auc_segment(
                times[i - 1],
                concentrations[i - 1],
                times[i],
                concentrations[i],
                method,
            )
        })
        .sum()
}

/// Calculate AUC up to the last measurable concentration (AUClast)
///
/// # Examples
///
/// ```rust
/// use crossnca::nca::{auc_last, AUCMethod};
///
/// let times = vec![0.0, 1.0, 2.0, 4.0, 8.0, 12.0];
/// let concs = vec![0.0, 10.0, 8.0, 4.0, 1.0, 0.0];
///
/// // Trailing zero is not integrated
/// let auc = auc_last(&times, &concs, AUCMethod::Linear);
/// assert!((auc - 36.0).abs() < 1e-10);
/// ```
pub fn auc_last(times: &[f64], concentrations: &[f64], method: AUCMethod) -> f64 {
    if times.len() < 2 || times.len() != concentrations.len() {
        return 0.0;
    }

    match concentrations.iter().rposition(|&c| c > 0.0) {
        Some(tlast_idx) => auc_to_index(times, concentrations, tlast_idx, method),
        None => 0.0,
    }
}
