//! Non-compartmental analysis and statistics of two-period crossover
//! pharmacokinetic studies, where every subject is sampled without and with an
//! enzyme inducer.
//!
//! The report runs as a chain of stages, each taking the previous output:
//!
//! 1. [data]: read the `ID`, `TAD`, `DV`, `IND`, `DOSE` observation file
//! 2. [aggregate]: mean and SD concentration per time point and group
//! 3. [nca]: Cmax, Tmax, AUClast, half-life and clearance per subject and group
//! 4. [paired]: one row per subject with both groups and their ratios
//! 5. [table]: medians (IQR) and geometric mean ratios (CI)
//! 6. [stats]: paired t-test, Wilcoxon signed-rank test and sample size
//! 7. [plot]: SVG figures
//!
//! [report::run] executes all of them from a [settings::Settings].

pub mod aggregate;
pub mod data;
pub mod error;
pub mod logger;
pub mod nca;
pub mod output;
pub mod paired;
pub mod plot;
pub mod report;
pub mod settings;
pub mod stats;
pub mod table;

pub use error::CrossNcaError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            read_observations, read_observations_from_reader, Group, Observation,
            ObservationTable, SubjectProfile,
        };
    }
    pub mod stats {
        pub use crate::stats::{
            geometric_mean_ci, median_iqr, paired_t_test, sample_size_paired,
            wilcoxon_signed_rank,
        };
    }

    pub use crate::aggregate::{aggregate, TimePointSummary};
    pub use crate::data::*;
    pub use crate::nca::{NCAOptions, NCARecord, NCATable, NCA};
    pub use crate::paired::{PairedTable, Parameter};
    pub use crate::report::{analyze, run, Report};
    pub use crate::settings::{read_settings, Settings};
    pub use crate::table::Table2;
    pub use crate::CrossNcaError;
}
