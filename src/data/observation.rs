use serde::{Deserialize, Serialize};
use std::fmt;

/// Induction condition of a study period
///
/// In the crossover design every subject is observed once without and once with
/// the inducer. The numeric value is the `IND` flag of the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// `IND = 0`
    NoInducer,
    /// `IND = 1`
    Inducer,
}

impl Group {
    /// Both groups, reference first
    pub const ALL: [Group; 2] = [Group::NoInducer, Group::Inducer];

    /// Parse the `IND` flag
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(Group::NoInducer),
            1 => Some(Group::Inducer),
            _ => None,
        }
    }

    /// The `IND` flag of this group
    pub fn flag(&self) -> u8 {
        match self {
            Group::NoInducer => 0,
            Group::Inducer => 1,
        }
    }

    /// Position of the group in fixed-size per-group storage
    pub fn index(&self) -> usize {
        self.flag() as usize
    }

    /// Human readable label used in tables and plot legends
    pub fn label(&self) -> &'static str {
        match self {
            Group::NoInducer => "No inducer",
            Group::Inducer => "Inducer",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single row of the data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Subject identifier (`ID`)
    pub subject: String,
    /// Time after dose in hours (`TAD`)
    pub time: f64,
    /// Observed concentration in ng/mL (`DV`), `None` when not recorded
    pub concentration: Option<f64>,
    /// Administered dose (`DOSE`), `None` when not recorded on this row
    pub dose: Option<f64>,
    /// Induction condition (`IND`)
    pub group: Group,
}

/// The concentration-time data of one subject in one group
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectProfile {
    pub subject: String,
    pub group: Group,
    /// Time points of the recorded concentrations, in file order
    pub times: Vec<f64>,
    /// Recorded concentrations, parallel to `times`
    pub concentrations: Vec<f64>,
    /// First dose recorded for this subject and group
    pub dose: Option<f64>,
}

/// All observations of a study, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    observations: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Distinct subject identifiers, sorted
    pub fn subjects(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.observations.iter().map(|o| o.subject.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Collect the profile of a subject in a group
    ///
    /// Rows without a concentration are skipped. Returns `None` when the subject
    /// has no rows at all in that group.
    pub fn profile(&self, subject: &str, group: Group) -> Option<SubjectProfile> {
        let rows: Vec<&Observation> = self
            .observations
            .iter()
            .filter(|o| o.subject == subject && o.group == group)
            .collect();

        if rows.is_empty() {
            return None;
        }

        let dose = rows.iter().find_map(|o| o.dose);
        let (times, concentrations) = rows
            .iter()
            .filter_map(|o| o.concentration.map(|c| (o.time, c)))
            .unzip();

        Some(SubjectProfile {
            subject: subject.to_string(),
            group,
            times,
            concentrations,
            dose,
        })
    }

    /// Every (subject, group) profile present in the table, ordered by subject then group
    pub fn profiles(&self) -> Vec<SubjectProfile> {
        self.subjects()
            .iter()
            .flat_map(|id| Group::ALL.iter().filter_map(move |g| self.profile(id, *g)))
            .collect()
    }
}

impl From<Vec<Observation>> for ObservationTable {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

impl<'a> IntoIterator for &'a ObservationTable {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
