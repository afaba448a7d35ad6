pub mod observation;
pub mod parser;
pub use observation::{Group, Observation, ObservationTable, SubjectProfile};
pub use parser::{read_observations, read_observations_from_reader, DataError, REQUIRED_COLUMNS};
