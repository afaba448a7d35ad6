//! NCA types: options, per-profile results and the result table
//!
//! This module defines all public types for NCA analysis including:
//! - [`NCAOptions`]: Configuration options
//! - [`NCARecord`]: Results for one subject in one group
//! - [`NCATable`]: All records of a study, with the unit of clearance

use super::error::NCAError;
use crate::data::Group;
use crate::paired::Parameter;
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Types
// ============================================================================

/// Method for calculating AUC segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AUCMethod {
    /// Linear trapezoidal rule: (C₁ + C₂) / 2 × Δt
    Linear,
    /// Linear up/log down: linear for ascending, log-linear for descending
    #[default]
    LinUpLogDown,
}

/// Complete NCA configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NCAOptions {
    /// AUC calculation method (default: LinUpLogDown)
    pub auc_method: AUCMethod,
    /// Terminal phase (λz) estimation options
    pub lambda_z: LambdaZOptions,
}

impl Default for NCAOptions {
    fn default() -> Self {
        Self {
            auc_method: AUCMethod::LinUpLogDown,
            lambda_z: LambdaZOptions::default(),
        }
    }
}

impl NCAOptions {
    /// Set AUC calculation method
    pub fn with_auc_method(mut self, method: AUCMethod) -> Self {
        self.auc_method = method;
        self
    }

    /// Set minimum R² for lambda-z
    pub fn with_min_r_squared(mut self, min_r_squared: f64) -> Self {
        self.lambda_z.min_r_squared = min_r_squared;
        self
    }

    /// Check the options for values the analysis cannot work with
    pub fn validate(&self) -> Result<(), NCAError> {
        let lz = &self.lambda_z;
        if lz.min_points < 3 {
            return Err(NCAError::InvalidParameter {
                param: "lambda_z.min_points".to_string(),
                value: lz.min_points.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&lz.min_r_squared) {
            return Err(NCAError::InvalidParameter {
                param: "lambda_z.min_r_squared".to_string(),
                value: lz.min_r_squared.to_string(),
            });
        }
        if !lz.min_span_ratio.is_finite() || lz.min_span_ratio < 0.0 {
            return Err(NCAError::InvalidParameter {
                param: "lambda_z.min_span_ratio".to_string(),
                value: lz.min_span_ratio.to_string(),
            });
        }
        Ok(())
    }
}

/// Lambda-z estimation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LambdaZOptions {
    /// Minimum number of points for regression (default: 3)
    pub min_points: usize,
    /// Maximum number of points (None = no limit)
    pub max_points: Option<usize>,
    /// Minimum R² to accept (default: 0.90)
    pub min_r_squared: f64,
    /// Minimum span ratio (default: 2.0)
    pub min_span_ratio: f64,
    /// Whether to include Tmax in regression (default: false)
    pub include_tmax: bool,
    /// Factor added to adjusted R² to prefer more points (default: 0.0001, PKNCA default)
    ///
    /// The scoring formula becomes: adj_r_squared + adj_r_squared_factor * n_points
    pub adj_r_squared_factor: f64,
}

impl Default for LambdaZOptions {
    fn default() -> Self {
        Self {
            min_points: 3,
            max_points: None,
            min_r_squared: 0.90,
            min_span_ratio: 2.0,
            include_tmax: false,
            adj_r_squared_factor: 0.0001,
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Goodness of fit of the terminal regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionStats {
    pub lambda_z: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub n_points: usize,
    pub time_first: f64,
    pub time_last: f64,
    /// (time_last - time_first) / half-life
    pub span_ratio: f64,
}

/// NCA parameters of one subject in one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NCARecord {
    pub subject: String,
    pub group: Group,
    /// Dose used for clearance, if recorded
    pub dose: Option<f64>,
    pub cmax: f64,
    pub tmax: f64,
    pub clast: f64,
    pub tlast: f64,
    pub auc_last: f64,
    /// AUC extrapolated to infinity with observed Clast
    pub auc_inf: Option<f64>,
    pub auc_pct_extrap: Option<f64>,
    pub half_life: Option<f64>,
    /// Dose / AUCinf, in the unit tracked by the owning [NCATable]
    pub clearance: Option<f64>,
    /// Terminal regression, if one passed the quality criteria
    pub regression: Option<RegressionStats>,
}

impl NCARecord {
    /// Value of a reported parameter, `None` when undefined
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::AucLast => Some(self.auc_last),
            Parameter::Cmax => Some(self.cmax),
            Parameter::HalfLife => self.half_life,
            Parameter::Clearance => self.clearance,
            Parameter::Tmax => Some(self.tmax),
        }
    }
}

/// Unit of the clearance values in an [NCATable]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceUnit {
    /// As computed, dose over AUC: mL/h for a dose in µg and concentrations in ng/mL
    #[default]
    MlPerHour,
    /// After [NCATable::rescale_clearance]
    LPerHour,
}

impl ClearanceUnit {
    pub fn label(&self) -> &'static str {
        match self {
            ClearanceUnit::MlPerHour => "mL/h",
            ClearanceUnit::LPerHour => "L/h",
        }
    }
}

/// All NCA records of a study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NCATable {
    records: Vec<NCARecord>,
    clearance_unit: ClearanceUnit,
}

impl NCATable {
    /// Wrap freshly computed records, clearance in [ClearanceUnit::MlPerHour]
    pub fn new(records: Vec<NCARecord>) -> Self {
        Self {
            records,
            clearance_unit: ClearanceUnit::MlPerHour,
        }
    }

    pub fn records(&self) -> &[NCARecord] {
        &self.records
    }

    pub fn clearance_unit(&self) -> ClearanceUnit {
        self.clearance_unit
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert clearance from mL/h to L/h by dividing by 1000
    ///
    /// The conversion is tracked on the table, a second call returns
    /// [NCAError::ClearanceAlreadyRescaled] and leaves the values unchanged.
    pub fn rescale_clearance(&mut self) -> Result<(), NCAError> {
        if self.clearance_unit == ClearanceUnit::LPerHour {
            return Err(NCAError::ClearanceAlreadyRescaled);
        }

        for record in &mut self.records {
            record.clearance = record.clearance.map(|cl| cl / 1000.0);
        }
        self.clearance_unit = ClearanceUnit::LPerHour;
        Ok(())
    }

    /// Write one row per record, undefined values left empty
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
        let cl_header = format!("cl_{}", self.clearance_unit.label().replace('/', "_per_"));
        wtr.write_record([
            "id",
            "ind",
            "dose",
            "cmax",
            "tmax",
            "clast",
            "tlast",
            "auc_last",
            "auc_inf",
            "auc_pct_extrap",
            "half_life",
            cl_header.as_str(),
            "lambda_z",
            "r_squared",
            "adj_r_squared",
            "n_points",
        ])?;

        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        for r in &self.records {
            let reg = r.regression.as_ref();
            wtr.write_record([
                r.subject.clone(),
                r.group.flag().to_string(),
                opt(r.dose),
                r.cmax.to_string(),
                r.tmax.to_string(),
                r.clast.to_string(),
                r.tlast.to_string(),
                r.auc_last.to_string(),
                opt(r.auc_inf),
                opt(r.auc_pct_extrap),
                opt(r.half_life),
                opt(r.clearance),
                opt(reg.map(|s| s.lambda_z)),
                opt(reg.map(|s| s.r_squared)),
                opt(reg.map(|s| s.adj_r_squared)),
                reg.map(|s| s.n_points.to_string()).unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
