//! Non-Compartmental Analysis (NCA) for pharmacokinetic data
//!
//! This module calculates the standard NCA parameters of every (subject, group)
//! profile of an [`ObservationTable`](crate::data::ObservationTable).
//!
//! # Key Parameters
//!
//! | Parameter | Description |
//! |-----------|-------------|
//! | Cmax | Maximum observed concentration |
//! | Tmax | Time of maximum concentration |
//! | Clast | Last measurable concentration (> 0) |
//! | Tlast | Time of last measurable concentration |
//! | AUClast | Area under curve from the first sample to Tlast |
//! | AUCinf | AUC extrapolated to infinity |
//! | λz | Terminal elimination rate constant |
//! | t½ | Terminal half-life (ln(2)/λz) |
//! | CL/F | Apparent clearance, Dose / AUCinf |
//!
//! # Usage
//!
//! ```rust,ignore
//! use crossnca::prelude::*;
//!
//! let observations = read_observations("data/induction.csv")?;
//! let mut results = observations.nca(&NCAOptions::default())?;
//! results.rescale_clearance()?;
//!
//! for r in results.records() {
//!     println!("{} {}: Cmax {:.2}", r.subject, r.group, r.cmax);
//! }
//! ```

// Internal modules
mod analyze;
mod auc;
mod error;
mod profile;
mod terminal;
mod traits;
mod types;

#[cfg(test)]
mod tests;

// Public API
pub use auc::{auc_last, auc_segment};
pub use error::NCAError;
pub use terminal::{auc_extrap_pct, auc_inf, clearance, half_life, lambda_z, lambda_z_auto};
pub use traits::NCA;
pub use types::{
    AUCMethod, ClearanceUnit, LambdaZOptions, NCAOptions, NCARecord, NCATable, RegressionStats,
};
