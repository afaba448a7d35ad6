//! Power and sample size of the two-sided paired t-test
//!
//! With `n` pairs, standardized effect `d` (mean difference over SD of the
//! differences) and significance level α the power is
//!
//! ```text
//! power = P(T' > q) + P(T' < -q),   q = t(1 - α/2, n - 1),   T' ~ t'(n - 1, √n · d)
//! ```
//!
//! where `t'` is the noncentral t distribution. The sample size is the smallest
//! `n` reaching the requested power.

use super::error::StatsError;
use super::{normal_cdf, t_quantile};
use serde::Serialize;
use statrs::function::beta::beta_reg;
use statrs::function::gamma::ln_gamma;
use statrs::statistics::Statistics;

const LN_SQRT_PI: f64 = 0.572_364_942_924_700_1;
const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;
const MAX_ITERATIONS: usize = 1000;
const ERROR_BOUND: f64 = 1e-12;

/// Upper end of the sample size search
pub const MAX_SAMPLE_SIZE: f64 = 1e7;

/// Required number of pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSize {
    /// Real-valued solution of the power equation
    pub n_exact: f64,
    /// `n_exact` rounded up
    pub n: usize,
    pub effect_size: f64,
    pub alpha: f64,
    pub power: f64,
    /// Power achieved with `n` pairs
    pub achieved_power: f64,
}

/// Cumulative distribution function of the noncentral t distribution
///
/// Lenth (1989), Algorithm AS 243. Returns NaN for non-positive `df`.
pub fn noncentral_t_cdf(t: f64, df: f64, ncp: f64) -> f64 {
    if !(df > 0.0) || t.is_nan() || ncp.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return if t > 0.0 { 1.0 } else { 0.0 };
    }

    let (tt, del, negative) = if t >= 0.0 {
        (t, ncp, false)
    } else {
        (-t, -ncp, true)
    };

    // Very large df or ncp: normal approximation
    if df > 4e5 || del * del > 2.0 * std::f64::consts::LN_2 * 1021.0 {
        let s = 1.0 / (4.0 * df);
        let z = (tt * (1.0 - s) - del) / (1.0 + tt * tt * 2.0 * s).sqrt();
        let p = normal_cdf(z);
        return if negative { 1.0 - p } else { p };
    }

    let x = tt * tt / (tt * tt + df);
    let mut tnc = 0.0;

    if x > 0.0 {
        let lambda = del * del;
        let mut p = 0.5 * (-0.5 * lambda).exp();
        let mut q = SQRT_2_OVER_PI * p * del;
        let mut s = 0.5 - p;
        if s < 1e-7 {
            s = -0.5 * (-0.5 * lambda).exp_m1();
        }
        let mut a = 0.5;
        let b = 0.5 * df;
        let rxb = (1.0 - x).powf(b);
        let albeta = LN_SQRT_PI + ln_gamma(b) - ln_gamma(0.5 + b);
        let mut xodd = beta_reg(a, b, x);
        let mut godd = 2.0 * rxb * (a * x.ln() - albeta).exp();
        let bx = b * x;
        let mut xeven = if bx < f64::EPSILON { bx } else { 1.0 - rxb };
        let mut geven = bx * rxb;
        tnc = p * xodd + q * xeven;

        for it in 1..=MAX_ITERATIONS {
            a += 1.0;
            xodd -= godd;
            xeven -= geven;
            godd *= x * (a + b - 1.0) / a;
            geven *= x * (a + b - 0.5) / (a + 0.5);
            p *= lambda / (2 * it) as f64;
            q *= lambda / (2 * it + 1) as f64;
            tnc += p * xodd + q * xeven;
            s -= p;
            if s < -1e-10 || (s <= 0.0 && it > 1) {
                break;
            }
            let error_bound = 2.0 * s * (xodd - godd);
            if error_bound.abs() < ERROR_BOUND {
                break;
            }
        }
    }

    tnc += normal_cdf(-del);
    let tnc = tnc.clamp(0.0, 1.0);
    if negative {
        1.0 - tnc
    } else {
        tnc
    }
}

/// Power of the two-sided paired t-test with `n` pairs
pub fn power_paired(n: f64, effect_size: f64, alpha: f64) -> Result<f64, StatsError> {
    if !(n >= 2.0) || !n.is_finite() {
        return Err(StatsError::invalid("n", n));
    }
    check_probability("alpha", alpha)?;
    if !effect_size.is_finite() {
        return Err(StatsError::invalid("effect_size", effect_size));
    }

    let df = n - 1.0;
    let q = t_quantile(1.0 - alpha / 2.0, df)?;
    let ncp = n.sqrt() * effect_size;
    Ok(1.0 - noncentral_t_cdf(q, df, ncp) + noncentral_t_cdf(-q, df, ncp))
}

/// Number of pairs needed to detect `effect_size` with the given power
///
/// Solves the power equation for real `n` by bisection on `(2, 1e7]`.
///
/// ```
/// use crossnca::stats::sample_size_paired;
///
/// let size = sample_size_paired(-1.68, 0.05, 0.8).unwrap();
/// assert_eq!(size.n, 6);
/// ```
pub fn sample_size_paired(
    effect_size: f64,
    alpha: f64,
    power: f64,
) -> Result<SampleSize, StatsError> {
    if !effect_size.is_finite() || effect_size == 0.0 {
        return Err(StatsError::invalid("effect_size", effect_size));
    }
    check_probability("alpha", alpha)?;
    check_probability("power", power)?;
    if power <= alpha {
        return Err(StatsError::invalid("power", power));
    }

    let mut lo = 2.0;
    let mut hi = MAX_SAMPLE_SIZE;

    let n_exact = if power_paired(lo, effect_size, alpha)? >= power {
        lo
    } else {
        if power_paired(hi, effect_size, alpha)? < power {
            return Err(StatsError::invalid("effect_size", effect_size));
        }
        while hi - lo > 1e-10 * hi.max(1.0) {
            let mid = 0.5 * (lo + hi);
            if power_paired(mid, effect_size, alpha)? < power {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        hi
    };

    let n = n_exact.ceil() as usize;
    let achieved_power = power_paired(n as f64, effect_size, alpha)?;
    tracing::debug!(n_exact, n, achieved_power, "Sample size solved");

    Ok(SampleSize {
        n_exact,
        n,
        effect_size,
        alpha,
        power,
        achieved_power,
    })
}

/// Cohen's d from two group means and their pooled SD
pub fn cohens_d(mean_a: f64, mean_b: f64, pooled_sd: f64) -> Result<f64, StatsError> {
    if !(pooled_sd > 0.0) || !pooled_sd.is_finite() {
        return Err(StatsError::invalid("pooled_sd", pooled_sd));
    }
    Ok((mean_a - mean_b) / pooled_sd)
}

/// Pooled standard deviation of two samples
pub fn pooled_sd(a: &[f64], b: &[f64]) -> Result<f64, StatsError> {
    for s in [a, b] {
        if s.len() < 2 {
            return Err(StatsError::InsufficientData {
                n: s.len(),
                required: 2,
            });
        }
        if s.iter().any(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite);
        }
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let pooled = ((na - 1.0) * a.iter().variance() + (nb - 1.0) * b.iter().variance())
        / (na + nb - 2.0);
    Ok(pooled.sqrt())
}

fn check_probability(name: &str, value: f64) -> Result<(), StatsError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(StatsError::invalid(name, value))
    }
}
