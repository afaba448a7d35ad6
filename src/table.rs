//! Summary table of the crossover comparison ("Table 2")
//!
//! One row for the number of subjects, then one row per [Parameter] in table
//! order with the median (IQR) of each group and the geometric mean of the
//! within-subject ratios with its confidence interval.

use crate::data::Group;
use crate::paired::{Parameter, PairedTable};
use crate::stats::{geometric_mean_ci, median_iqr, StatsError};
use serde::Serialize;
use thiserror::Error;

/// Placeholder for cells without a statistic
pub const NA: &str = "NA";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("No subjects to summarize")]
    Empty,

    /// A statistic failed on data that should never reach it, e.g. a zero AUC
    #[error("{column} of {parameter}: {source}")]
    Statistic {
        parameter: Parameter,
        column: String,
        #[source]
        source: StatsError,
    },
}

/// One formatted row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table2Row {
    pub label: String,
    pub unit: String,
    pub no_inducer: String,
    pub inducer: String,
    pub gmr: String,
}

impl Table2Row {
    fn cells(&self) -> [&str; 5] {
        [
            self.label.as_str(),
            self.unit.as_str(),
            self.no_inducer.as_str(),
            self.inducer.as_str(),
            self.gmr.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table2 {
    pub header: [String; 5],
    pub rows: Vec<Table2Row>,
}

impl Table2 {
    /// Assemble the table from paired NCA results
    ///
    /// Undefined values are left out of a cell's statistic and logged. Cells
    /// without enough values show [NA]. Non-positive ratios abort the assembly.
    pub fn build(paired: &PairedTable, level: f64) -> Result<Self, TableError> {
        if paired.is_empty() {
            return Err(TableError::Empty);
        }

        let header = [
            "Parameter".to_string(),
            "Unit".to_string(),
            format!("{}, median (IQR)", Group::NoInducer.label()),
            format!("{}, median (IQR)", Group::Inducer.label()),
            format!("GMR ({:.0}% CI)", level * 100.0),
        ];

        let mut rows = vec![Table2Row {
            label: "Subjects (n)".to_string(),
            unit: String::new(),
            no_inducer: paired.group_count(Group::NoInducer).to_string(),
            inducer: paired.group_count(Group::Inducer).to_string(),
            gmr: paired.complete_count().to_string(),
        }];

        for parameter in Parameter::ALL {
            let no_inducer = group_cell(paired, parameter, Group::NoInducer)?;
            let inducer = group_cell(paired, parameter, Group::Inducer)?;
            let gmr = if parameter.is_ratio_comparable() {
                ratio_cell(paired, parameter, level)?
            } else {
                NA.to_string()
            };

            rows.push(Table2Row {
                label: parameter.label().to_string(),
                unit: paired.unit(parameter).to_string(),
                no_inducer,
                inducer,
                gmr,
            });
        }

        tracing::info!("Summary table assembled with {} rows", rows.len());
        Ok(Self { header, rows })
    }

    /// Row of a parameter
    pub fn row(&self, parameter: Parameter) -> Option<&Table2Row> {
        self.rows.iter().find(|r| r.label == parameter.label())
    }

    /// Plain-text rendering with left-aligned, padded columns
    pub fn render_text(&self) -> String {
        let mut widths = self.header.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row.cells()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: [&str; 5]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let mut out = String::new();
        out.push_str(&line(self.header.each_ref().map(|h| h.as_str())));
        out.push('\n');
        let rule_len = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        out.push_str(&"-".repeat(rule_len));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row.cells()));
            out.push('\n');
        }
        out
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row.cells())?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn group_cell(paired: &PairedTable, parameter: Parameter, group: Group) -> Result<String, TableError> {
    let values = paired.group_values(parameter, group);
    let undefined = paired.group_count(group).saturating_sub(values.len());
    if undefined > 0 {
        tracing::warn!(
            "{} ({}): {} undefined values left out of the median",
            parameter,
            group,
            undefined
        );
    }
    if values.is_empty() {
        return Ok(NA.to_string());
    }

    median_iqr(&values)
        .map(|m| m.to_string())
        .map_err(|source| TableError::Statistic {
            parameter,
            column: group.label().to_string(),
            source,
        })
}

fn ratio_cell(paired: &PairedTable, parameter: Parameter, level: f64) -> Result<String, TableError> {
    let reference = paired
        .rows()
        .iter()
        .filter(|r| r.is_complete(parameter))
        .filter_map(|r| r.get(parameter, Group::NoInducer));
    for value in reference {
        if value <= 0.0 {
            return Err(TableError::Statistic {
                parameter,
                column: "GMR".to_string(),
                source: StatsError::NonPositive { value },
            });
        }
    }

    let ratios: Vec<f64> = paired
        .rows()
        .iter()
        .filter(|r| r.is_complete(parameter))
        .map(|r| r.ratio(parameter))
        .collect();

    let undefined = paired.complete_count().saturating_sub(ratios.len());
    if undefined > 0 {
        tracing::warn!(
            "{}: {} subjects without a defined ratio left out of the GMR",
            parameter,
            undefined
        );
    }

    match geometric_mean_ci(&ratios, level) {
        Ok(gm) => Ok(gm.to_string()),
        Err(StatsError::Empty | StatsError::InsufficientData { .. }) => {
            tracing::warn!("{}: too few ratios for a GMR", parameter);
            Ok(NA.to_string())
        }
        Err(source) => Err(TableError::Statistic {
            parameter,
            column: "GMR".to_string(),
            source,
        }),
    }
}
