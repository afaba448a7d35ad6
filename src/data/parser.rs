use super::observation::{Group, Observation, ObservationTable};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Column names the data file must provide, in the order they are reported when missing
pub const REQUIRED_COLUMNS: [&str; 5] = ["ID", "TAD", "DV", "IND", "DOSE"];

/// Errors raised while loading the observation file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Error encountered when reading CSV data
    #[error("CSV error: {0}")]
    CSVError(String),
    /// A required column is absent from the header
    #[error("Missing column: {column}")]
    MissingColumn { column: String },
    /// A cell could not be parsed into the expected type
    #[error("Invalid value '{value}' in column {column} on line {line}")]
    InvalidValue {
        column: String,
        value: String,
        line: u64,
    },
    /// Subject identifier is empty
    #[error("Empty ID on line {line}")]
    EmptyId { line: u64 },
    /// The induction flag is neither 0 nor 1
    #[error("IND must be 0 or 1, got '{value}' on line {line}")]
    InvalidGroup { value: String, line: u64 },
    /// The file has a header but no data rows
    #[error("No observations in data file")]
    Empty,
}

/// Positions of the required columns in a header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    id: usize,
    tad: usize,
    dv: usize,
    ind: usize,
    dose: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DataError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let mut idx = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(name)?;
        }

        Ok(Self {
            id: idx[0],
            tad: idx[1],
            dv: idx[2],
            ind: idx[3],
            dose: idx[4],
        })
    }
}

/// Read an observation file
///
/// The file is a comma separated table with at least the columns `ID`, `TAD`, `DV`,
/// `IND` and `DOSE`. Column names are matched exactly; extra columns are ignored.
/// Lines starting with `#` are treated as comments.
///
/// Missing concentrations and doses (empty cell, `.` or `NA`) are kept as `None`.
///
/// # Example
///
/// ```rust,no_run
/// use crossnca::data::read_observations;
///
/// let table = read_observations("data/induction.csv").unwrap();
/// println!("Number of subjects: {}", table.subjects().len());
/// ```
pub fn read_observations(path: impl AsRef<Path>) -> Result<ObservationTable, DataError> {
    let path = path.as_ref();
    tracing::debug!("Reading observations from {}", path.display());

    let file = std::fs::File::open(path)
        .map_err(|e| DataError::CSVError(format!("{}: {}", path.display(), e)))?;
    read_observations_from_reader(file)
}

/// Read observations from any reader, see [read_observations]
pub fn read_observations_from_reader<R: Read>(reader: R) -> Result<ObservationTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DataError::CSVError(e.to_string()))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::CSVError(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        observations.push(parse_record(&record, &columns, line)?);
    }

    if observations.is_empty() {
        return Err(DataError::Empty);
    }

    tracing::debug!("Read {} observations", observations.len());
    Ok(ObservationTable::new(observations))
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &ColumnIndex,
    line: u64,
) -> Result<Observation, DataError> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let subject = cell(columns.id).to_string();
    if subject.is_empty() {
        return Err(DataError::EmptyId { line });
    }

    let time = parse_option_f64(cell(columns.tad), "TAD", line)?
        .filter(|t| t.is_finite())
        .ok_or_else(|| DataError::InvalidValue {
            column: "TAD".to_string(),
            value: cell(columns.tad).to_string(),
            line,
        })?;

    let concentration = parse_option_f64(cell(columns.dv), "DV", line)?;
    let dose = parse_option_f64(cell(columns.dose), "DOSE", line)?;

    let raw_group = cell(columns.ind);
    let group = raw_group
        .parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0)
        .and_then(|f| Group::from_flag(f as i64))
        .ok_or_else(|| DataError::InvalidGroup {
            value: raw_group.to_string(),
            line,
        })?;

    Ok(Observation {
        subject,
        time,
        concentration,
        dose,
        group,
    })
}

/// Parse an optional number, treating empty, `.` and `NA` as missing
fn parse_option_f64(value: &str, column: &str, line: u64) -> Result<Option<f64>, DataError> {
    match value {
        "" | "." | "NA" => Ok(None),
        s => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| DataError::InvalidValue {
                column: column.to_string(),
                value: s.to_string(),
                line,
            }),
    }
}
