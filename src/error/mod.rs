use thiserror::Error;

use crate::data::DataError;
use crate::nca::NCAError;
use crate::paired::PairedError;
use crate::plot::PlotError;
use crate::settings::SettingsError;
use crate::stats::StatsError;
use crate::table::TableError;

#[derive(Error, Debug)]
pub enum CrossNcaError {
    #[error("Error reading the settings: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("Error reading the data: {0}")]
    DataError(#[from] DataError),
    #[error("Error in the NCA: {0}")]
    NCAError(#[from] NCAError),
    #[error("Error pairing the NCA results: {0}")]
    PairedError(#[from] PairedError),
    #[error("Error in a statistic: {0}")]
    StatsError(#[from] StatsError),
    #[error("Error building the summary table: {0}")]
    TableError(#[from] TableError),
    #[error("Error drawing a plot: {0}")]
    PlotError(#[from] PlotError),
}
