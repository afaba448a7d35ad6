//! NCA error types

use crate::data::Group;
use thiserror::Error;

/// Errors that can occur during NCA analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NCAError {
    /// Too few measured concentrations to integrate
    #[error("Insufficient data for subject {subject} ({group}): {n} points, need at least {required}")]
    InsufficientData {
        subject: String,
        group: Group,
        n: usize,
        required: usize,
    },

    /// Two concentrations recorded at the same time
    #[error("Duplicate time {time} for subject {subject} ({group})")]
    DuplicateTime {
        subject: String,
        group: Group,
        time: f64,
    },

    /// Negative or non-finite concentration
    #[error("Invalid concentration {value} at time {time} for subject {subject} ({group})")]
    InvalidConcentration {
        subject: String,
        group: Group,
        time: f64,
        value: f64,
    },

    /// Invalid option value
    #[error("Invalid parameter: {param} = {value}")]
    InvalidParameter { param: String, value: String },

    /// Clearance was already converted to L/h
    #[error("Clearance is already expressed in L/h; rescaling again would divide it twice")]
    ClearanceAlreadyRescaled,
}
