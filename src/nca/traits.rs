//! Extension traits for NCA analysis on crossnca data types
//!
//! The [`NCA`] trait adds non-compartmental analysis to [`SubjectProfile`] and
//! [`ObservationTable`] without creating a dependency from `data` → `nca`.
//!
//! ```rust,ignore
//! use crossnca::prelude::*;
//!
//! let table = observations.nca(&NCAOptions::default())?;
//! ```

use super::analyze::analyze;
use super::error::NCAError;
use super::profile::Profile;
use super::types::{NCAOptions, NCARecord, NCATable};
use crate::data::{ObservationTable, SubjectProfile};

/// Extension trait for Non-Compartmental Analysis
pub trait NCA {
    type Output;

    /// Run NCA with the given options
    fn nca(&self, options: &NCAOptions) -> Result<Self::Output, NCAError>;
}

impl NCA for SubjectProfile {
    type Output = NCARecord;

    fn nca(&self, options: &NCAOptions) -> Result<NCARecord, NCAError> {
        let profile = Profile::from_subject(self)?;
        Ok(analyze(&profile, options))
    }
}

impl NCA for ObservationTable {
    type Output = NCATable;

    /// One record per analysable (subject, group), ordered by subject then group.
    ///
    /// A profile with fewer than two measured concentrations is skipped with a
    /// warning, so that subject's ratios end up undefined. Any other invalid
    /// profile aborts the analysis.
    fn nca(&self, options: &NCAOptions) -> Result<NCATable, NCAError> {
        options.validate()?;

        let mut records = Vec::new();
        for profile in self.profiles() {
            match profile.nca(options) {
                Ok(record) => records.push(record),
                Err(err @ NCAError::InsufficientData { .. }) => {
                    tracing::warn!("Skipping profile: {}", err);
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!("NCA computed for {} profiles", records.len());
        Ok(NCATable::new(records))
    }
}
