//! Statistics error types

use thiserror::Error;

/// Errors from the summary statistics, hypothesis tests and power calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Empty input")]
    Empty,

    #[error("Input contains a non-finite value")]
    NonFinite,

    /// Geometric statistics require strictly positive values
    #[error("Non-positive value {value}: geometric statistics require positive values")]
    NonPositive { value: f64 },

    #[error("Insufficient data: {n} values, need at least {required}")]
    InsufficientData { n: usize, required: usize },

    /// All values (or differences) are identical, the test statistic is undefined
    #[error("Data are essentially constant")]
    ConstantData,

    #[error("Invalid argument: {name} = {value}")]
    InvalidArgument { name: String, value: String },

    /// Failure constructing a reference distribution
    #[error("Distribution error: {0}")]
    Distribution(String),
}

impl StatsError {
    pub(crate) fn invalid(name: &str, value: impl ToString) -> Self {
        StatsError::InvalidArgument {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
