//! Internal profile representation for NCA analysis
//!
//! The Profile struct is a validated, analysis-ready concentration-time dataset.
//! It caches key indices for efficiency.

use super::error::NCAError;
use crate::data::{Group, SubjectProfile};
use std::cmp::Ordering;

/// A validated concentration-time profile ready for NCA analysis
#[derive(Debug, Clone)]
pub(crate) struct Profile {
    pub subject: String,
    pub group: Group,
    /// Time points (sorted, ascending, unique)
    pub times: Vec<f64>,
    /// Concentration values (parallel to times)
    pub concentrations: Vec<f64>,
    pub dose: Option<f64>,
    /// Index of Cmax in the arrays (first occurrence)
    pub cmax_idx: usize,
    /// Index of Clast (last positive concentration, 0 if none)
    pub tlast_idx: usize,
}

impl Profile {
    /// Validate a subject profile
    ///
    /// # Errors
    /// Returns error if there are fewer than two points, repeated times, or
    /// negative/non-finite concentrations
    pub fn from_subject(source: &SubjectProfile) -> Result<Self, NCAError> {
        let mut points: Vec<(f64, f64)> = source
            .times
            .iter()
            .copied()
            .zip(source.concentrations.iter().copied())
            .collect();

        if points.len() < 2 {
            return Err(NCAError::InsufficientData {
                subject: source.subject.clone(),
                group: source.group,
                n: points.len(),
                required: 2,
            });
        }

        if let Some(&(time, value)) = points.iter().find(|(_, c)| !c.is_finite() || *c < 0.0) {
            return Err(NCAError::InvalidConcentration {
                subject: source.subject.clone(),
                group: source.group,
                time,
                value,
            });
        }

        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        if let Some(pair) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(NCAError::DuplicateTime {
                subject: source.subject.clone(),
                group: source.group,
                time: pair[0].0,
            });
        }

        let (times, concentrations): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();

        // First occurrence in case of ties, matching PKNCA
        let cmax_idx = concentrations
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(max_i, max_c), (i, &c)| {
                if c > max_c {
                    (i, c)
                } else {
                    (max_i, max_c)
                }
            })
            .0;

        let tlast_idx = concentrations.iter().rposition(|&c| c > 0.0).unwrap_or(0);

        Ok(Self {
            subject: source.subject.clone(),
            group: source.group,
            times,
            concentrations,
            dose: source.dose,
            cmax_idx,
            tlast_idx,
        })
    }

    pub fn cmax(&self) -> f64 {
        self.concentrations[self.cmax_idx]
    }

    pub fn tmax(&self) -> f64 {
        self.times[self.cmax_idx]
    }

    pub fn clast(&self) -> f64 {
        self.concentrations[self.tlast_idx]
    }

    pub fn tlast(&self) -> f64 {
        self.times[self.tlast_idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(times: Vec<f64>, concs: Vec<f64>) -> SubjectProfile {
        SubjectProfile {
            subject: "1".to_string(),
            group: Group::NoInducer,
            times,
            concentrations: concs,
            dose: Some(100.0),
        }
    }

    #[test]
    fn test_profile_sorts_and_indexes() {
        let p = Profile::from_subject(&source(
            vec![2.0, 0.0, 1.0, 4.0, 6.0],
            vec![8.0, 0.0, 10.0, 2.0, 0.0],
        ))
        .unwrap();

        assert_eq!(p.times, vec![0.0, 1.0, 2.0, 4.0, 6.0]);
        assert_eq!(p.concentrations, vec![0.0, 10.0, 8.0, 2.0, 0.0]);
        assert_eq!(p.cmax(), 10.0);
        assert_eq!(p.tmax(), 1.0);
        assert_eq!(p.tlast(), 4.0);
        assert_eq!(p.clast(), 2.0);
    }

    #[test]
    fn test_first_maximum_wins() {
        let p = Profile::from_subject(&source(vec![0.0, 1.0, 2.0], vec![5.0, 5.0, 1.0])).unwrap();
        assert_eq!(p.cmax_idx, 0);
    }

    #[test]
    fn test_profile_errors() {
        let err = Profile::from_subject(&source(vec![1.0], vec![1.0])).unwrap_err();
        assert!(matches!(err, NCAError::InsufficientData { n: 1, .. }));

        let err = Profile::from_subject(&source(vec![1.0, 1.0], vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, NCAError::DuplicateTime { time, .. } if time == 1.0));

        let err = Profile::from_subject(&source(vec![0.0, 1.0], vec![1.0, -2.0])).unwrap_err();
        assert!(matches!(err, NCAError::InvalidConcentration { .. }));
    }
}
