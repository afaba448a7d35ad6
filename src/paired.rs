//! Within-subject pairing of NCA results
//!
//! [PairedTable] turns the long NCA table (one record per subject and group) into
//! one row per subject. Each row stores every reported [Parameter] for both
//! groups in a fixed array, so there is no name-based column lookup to collide.

use crate::data::Group;
use crate::nca::{ClearanceUnit, NCATable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// NCA parameters reported in the summary table, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    AucLast,
    Cmax,
    HalfLife,
    Clearance,
    Tmax,
}

impl Parameter {
    /// All parameters in the order of the summary table
    pub const ALL: [Parameter; 5] = [
        Parameter::AucLast,
        Parameter::Cmax,
        Parameter::HalfLife,
        Parameter::Clearance,
        Parameter::Tmax,
    ];

    /// Position in fixed-size per-parameter storage
    pub fn index(&self) -> usize {
        match self {
            Parameter::AucLast => 0,
            Parameter::Cmax => 1,
            Parameter::HalfLife => 2,
            Parameter::Clearance => 3,
            Parameter::Tmax => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::AucLast => "AUClast",
            Parameter::Cmax => "Cmax",
            Parameter::HalfLife => "t1/2",
            Parameter::Clearance => "CL/F",
            Parameter::Tmax => "Tmax",
        }
    }

    /// Identifier used in file names and CSV headers
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::AucLast => "auc_last",
            Parameter::Cmax => "cmax",
            Parameter::HalfLife => "half_life",
            Parameter::Clearance => "clearance",
            Parameter::Tmax => "tmax",
        }
    }

    /// Unit of the parameter, clearance in L/h
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::AucLast => "ng*h/mL",
            Parameter::Cmax => "ng/mL",
            Parameter::HalfLife | Parameter::Tmax => "h",
            Parameter::Clearance => "L/h",
        }
    }

    /// Whether an inducer / no-inducer ratio is meaningful
    ///
    /// Tmax is a sampling time, not an exposure measure.
    pub fn is_ratio_comparable(&self) -> bool {
        !matches!(self, Parameter::Tmax)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PairedError {
    /// Two NCA records for the same subject and group
    #[error("Duplicate NCA record for subject {subject} ({group})")]
    DuplicateRecord { subject: String, group: Group },
}

/// NCA values of one subject under both conditions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedRow {
    pub subject: String,
    values: [[Option<f64>; 2]; 5],
}

impl PairedRow {
    fn new(subject: String) -> Self {
        Self {
            subject,
            values: [[None; 2]; 5],
        }
    }

    /// Value of a parameter in a group, `None` when not available
    pub fn get(&self, parameter: Parameter, group: Group) -> Option<f64> {
        self.values[parameter.index()][group.index()]
    }

    /// Whether both groups have a value for the parameter
    pub fn is_complete(&self, parameter: Parameter) -> bool {
        Group::ALL.iter().all(|g| self.get(parameter, *g).is_some())
    }

    /// Inducer value divided by no-inducer value
    ///
    /// NaN when either value is missing or non-finite, or when the no-inducer
    /// value is zero.
    pub fn ratio(&self, parameter: Parameter) -> f64 {
        match (
            self.get(parameter, Group::Inducer),
            self.get(parameter, Group::NoInducer),
        ) {
            (Some(num), Some(den)) if den != 0.0 && num.is_finite() && den.is_finite() => num / den,
            _ => f64::NAN,
        }
    }
}

/// One row per subject with both groups side by side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairedTable {
    rows: Vec<PairedRow>,
    clearance_unit: ClearanceUnit,
}

impl PairedTable {
    /// Pivot the NCA table to wide form, rows sorted by subject
    ///
    /// Undefined NCA values (e.g. no terminal phase) stay `None` in the row.
    pub fn from_nca(table: &NCATable) -> Result<Self, PairedError> {
        let mut rows: BTreeMap<String, (PairedRow, [bool; 2])> = BTreeMap::new();

        for record in table.records() {
            let (row, seen) = rows
                .entry(record.subject.clone())
                .or_insert_with(|| (PairedRow::new(record.subject.clone()), [false; 2]));

            let g = record.group.index();
            if seen[g] {
                return Err(PairedError::DuplicateRecord {
                    subject: record.subject.clone(),
                    group: record.group,
                });
            }
            seen[g] = true;

            for parameter in Parameter::ALL {
                row.values[parameter.index()][g] = record.value(parameter);
            }
        }

        let table = Self {
            rows: rows.into_values().map(|(row, _)| row).collect(),
            clearance_unit: table.clearance_unit(),
        };

        let incomplete = table
            .rows
            .iter()
            .filter(|r| !r.is_complete(Parameter::AucLast))
            .count();
        if incomplete > 0 {
            tracing::warn!(
                "{} of {} subjects lack NCA results in one of the groups; their ratios are undefined",
                incomplete,
                table.rows.len()
            );
        }

        Ok(table)
    }

    pub fn rows(&self) -> &[PairedRow] {
        &self.rows
    }

    /// Unit of the clearance values, inherited from the NCA table
    pub fn clearance_unit(&self) -> ClearanceUnit {
        self.clearance_unit
    }

    /// Unit label of a parameter as stored in this table
    pub fn unit(&self, parameter: Parameter) -> &'static str {
        match parameter {
            Parameter::Clearance => self.clearance_unit.label(),
            other => other.unit(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one group, undefined values skipped
    pub fn group_values(&self, parameter: Parameter, group: Group) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.get(parameter, group))
            .collect()
    }

    /// Number of subjects with a result in the group
    pub fn group_count(&self, group: Group) -> usize {
        self.rows
            .iter()
            .filter(|r| r.get(Parameter::AucLast, group).is_some())
            .count()
    }

    /// Matched `(no_inducer, inducer)` samples of the subjects with both values
    pub fn complete_pairs(&self, parameter: Parameter) -> (Vec<f64>, Vec<f64>) {
        self.rows
            .iter()
            .filter_map(|r| {
                Some((
                    r.get(parameter, Group::NoInducer)?,
                    r.get(parameter, Group::Inducer)?,
                ))
            })
            .unzip()
    }

    /// Number of subjects with both groups present
    pub fn complete_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.is_complete(Parameter::AucLast))
            .count()
    }

    /// Write the wide table: per parameter both group columns, then the ratio
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);

        let mut header = vec!["id".to_string()];
        for parameter in Parameter::ALL {
            for group in Group::ALL {
                header.push(format!("{}_ind{}", parameter.key(), group.flag()));
            }
            header.push(format!("{}_ratio", parameter.key()));
        }
        wtr.write_record(&header)?;

        let fmt = |v: f64| {
            if v.is_finite() {
                v.to_string()
            } else {
                "NA".to_string()
            }
        };
        for row in &self.rows {
            let mut record = vec![row.subject.clone()];
            for parameter in Parameter::ALL {
                for group in Group::ALL {
                    record.push(fmt(row.get(parameter, group).unwrap_or(f64::NAN)));
                }
                record.push(fmt(row.ratio(parameter)));
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
