//! Concentration summaries per nominal time point
//!
//! Observations sharing the same time after dose and induction group are pooled
//! into one [TimePointSummary]. Missing concentrations do not contribute; a key
//! whose concentrations are all missing still produces a row with `n = 0`.

use crate::data::{Group, ObservationTable};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cmp::Ordering;

/// Mean and standard deviation of the concentrations at one (time, group)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePointSummary {
    pub time: f64,
    pub group: Group,
    /// Number of non-missing concentrations
    pub n: usize,
    /// Arithmetic mean, NaN when `n = 0`
    pub mean: f64,
    /// Sample standard deviation, NaN when `n < 2`
    pub sd: f64,
}

/// Aggregate the observations by (time after dose, group)
///
/// Rows are returned ordered by group, then by time.
pub fn aggregate(table: &ObservationTable) -> Vec<TimePointSummary> {
    let mut keyed: Vec<(Group, f64, Option<f64>)> = table
        .iter()
        .map(|o| (o.group, o.time, o.concentration))
        .collect();
    keyed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });

    let mut summaries = Vec::new();
    let mut start = 0;
    while start < keyed.len() {
        let (group, time, _) = keyed[start];
        let end = keyed[start..]
            .iter()
            .position(|(g, t, _)| *g != group || *t != time)
            .map(|offset| start + offset)
            .unwrap_or(keyed.len());

        let values: Vec<f64> = keyed[start..end].iter().filter_map(|k| k.2).collect();
        summaries.push(TimePointSummary {
            time,
            group,
            n: values.len(),
            mean: values.iter().mean(),
            sd: values.iter().std_dev(),
        });

        start = end;
    }

    tracing::debug!(
        "Aggregated {} observations into {} time points",
        table.len(),
        summaries.len()
    );
    summaries
}
