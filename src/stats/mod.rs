//! Statistics for the crossover comparison
//!
//! - [descriptive]: median (IQR) and geometric mean (CI) for the summary table
//! - [hypothesis]: paired t-test and Wilcoxon signed-rank test
//! - [power]: noncentral t power and sample size of the paired t-test
//!
//! All functions are pure: they take plain slices and return a result value or
//! a [StatsError]. Reference distributions come from `statrs`.

pub mod descriptive;
mod error;
pub mod hypothesis;
pub mod power;

pub use descriptive::{
    format_geometric_mean_ci, format_median_iqr, geometric_mean_ci, median_iqr, quantile,
    GeometricMeanCI, MedianIQR,
};
pub use error::StatsError;
pub use hypothesis::{
    paired_t_test, wilcoxon_signed_rank, PairedTTest, WilcoxonMethod, WilcoxonTest,
};
pub use power::{
    cohens_d, noncentral_t_cdf, pooled_sd, power_paired, sample_size_paired, SampleSize,
};

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Student's t-distribution quantile via `statrs`
pub(crate) fn t_quantile(p: f64, df: f64) -> Result<f64, StatsError> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(dist.inverse_cdf(p))
}

/// Standard normal CDF
pub(crate) fn normal_cdf(z: f64) -> f64 {
    // N(0, 1) parameters are always valid
    match Normal::new(0.0, 1.0) {
        Ok(n) => n.cdf(z),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_t_quantile() {
        assert_relative_eq!(t_quantile(0.975, 4.0).unwrap(), 2.776445105, epsilon = 1e-7);
        assert_relative_eq!(t_quantile(0.975, 1.0).unwrap(), 12.7062047362, epsilon = 1e-6);
        assert!(t_quantile(0.975, 0.0).is_err());
    }

    #[test]
    fn test_normal_cdf() {
        assert_relative_eq!(normal_cdf(0.0), 0.5);
        assert_relative_eq!(normal_cdf(1.959963984540054), 0.975, epsilon = 1e-10);
    }
}
