//! Unit tests for NCA analysis through the `NCA` trait

use super::*;
use crate::data::{Group, Observation, ObservationTable, SubjectProfile};
use approx::assert_relative_eq;

fn profile(times: &[f64], concs: &[f64], dose: Option<f64>) -> SubjectProfile {
    SubjectProfile {
        subject: "S1".to_string(),
        group: Group::NoInducer,
        times: times.to_vec(),
        concentrations: concs.to_vec(),
        dose,
    }
}

#[test]
fn test_exponential_profile() {
    // Rises to 16 at t=1, then falls 4-fold per hour (λz = ln 4)
    let record = profile(
        &[0.0, 1.0, 2.0, 3.0, 4.0],
        &[0.0, 16.0, 4.0, 1.0, 0.25],
        Some(100_000.0),
    )
    .nca(&NCAOptions::default())
    .unwrap();

    assert_eq!(record.cmax, 16.0);
    assert_eq!(record.tmax, 1.0);
    assert_eq!(record.tlast, 4.0);
    assert_eq!(record.clast, 0.25);

    // 0-1 linear: 8, then log-down segments (c1 - c2) / ln 4
    let ln4 = 4.0_f64.ln();
    let expected_auc = 8.0 + (12.0 + 3.0 + 0.75) / ln4;
    assert_relative_eq!(record.auc_last, expected_auc, epsilon = 1e-10);

    let fit = record.regression.as_ref().unwrap();
    assert_relative_eq!(fit.lambda_z, ln4, epsilon = 1e-10);
    assert_eq!(fit.n_points, 3);
    assert_relative_eq!(record.half_life.unwrap(), 0.5, epsilon = 1e-10);

    let auc_inf = expected_auc + 0.25 / ln4;
    assert_relative_eq!(record.auc_inf.unwrap(), auc_inf, epsilon = 1e-10);
    assert_relative_eq!(record.clearance.unwrap(), 100_000.0 / auc_inf, epsilon = 1e-8);
}

#[test]
fn test_linear_method() {
    let opts = NCAOptions::default().with_auc_method(AUCMethod::Linear);
    let record = profile(&[0.0, 1.0, 2.0], &[0.0, 10.0, 4.0], None)
        .nca(&opts)
        .unwrap();
    assert_relative_eq!(record.auc_last, 5.0 + 7.0);
}

#[test]
fn test_undefined_terminal_phase() {
    // Two points after Tmax: no regression, so no half-life or clearance
    let record = profile(&[0.0, 1.0, 2.0, 3.0], &[0.0, 8.0, 4.0, 2.0], Some(100.0))
        .nca(&NCAOptions::default())
        .unwrap();

    assert!(record.regression.is_none());
    assert_eq!(record.half_life, None);
    assert_eq!(record.auc_inf, None);
    assert_eq!(record.clearance, None);
    assert!(record.auc_last > 0.0);
}

#[test]
fn test_missing_dose_leaves_clearance_undefined() {
    let record = profile(
        &[0.0, 1.0, 2.0, 3.0, 4.0],
        &[0.0, 16.0, 4.0, 1.0, 0.25],
        None,
    )
    .nca(&NCAOptions::default())
    .unwrap();

    assert!(record.half_life.is_some());
    assert_eq!(record.clearance, None);
}

#[test]
fn test_trailing_zero_ignored() {
    let record = profile(
        &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        &[0.0, 16.0, 4.0, 1.0, 0.25, 0.0],
        Some(100.0),
    )
    .nca(&NCAOptions::default())
    .unwrap();

    assert_eq!(record.tlast, 4.0);
    assert_relative_eq!(record.half_life.unwrap(), 0.5, epsilon = 1e-10);
}

#[test]
fn test_table_nca_orders_records() {
    let mut rows = Vec::new();
    for (id, group, scale) in [
        ("B", Group::Inducer, 0.5),
        ("A", Group::Inducer, 0.5),
        ("A", Group::NoInducer, 1.0),
        ("B", Group::NoInducer, 1.0),
    ] {
        for (t, c) in [(0.0, 0.0), (1.0, 16.0), (2.0, 4.0), (3.0, 1.0), (4.0, 0.25)] {
            rows.push(Observation {
                subject: id.to_string(),
                time: t,
                concentration: Some(c * scale),
                dose: Some(100.0),
                group,
            });
        }
    }

    let table = ObservationTable::new(rows)
        .nca(&NCAOptions::default())
        .unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.clearance_unit(), ClearanceUnit::MlPerHour);
    let keys: Vec<(&str, Group)> = table
        .records()
        .iter()
        .map(|r| (r.subject.as_str(), r.group))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("A", Group::NoInducer),
            ("A", Group::Inducer),
            ("B", Group::NoInducer),
            ("B", Group::Inducer),
        ]
    );
    assert_relative_eq!(table.records()[1].cmax, 8.0);
}

#[test]
fn test_table_nca_rejects_invalid_options() {
    let table = ObservationTable::new(vec![]);
    let mut opts = NCAOptions::default();
    opts.lambda_z.min_points = 1;
    assert!(matches!(
        table.nca(&opts),
        Err(NCAError::InvalidParameter { .. })
    ));
}

#[test]
fn test_table_nca_propagates_profile_errors() {
    let table = ObservationTable::new(vec![Observation {
        subject: "X".to_string(),
        time: 0.0,
        concentration: Some(1.0),
        dose: Some(100.0),
        group: Group::Inducer,
    }]);

    let err = table.nca(&NCAOptions::default()).unwrap_err();
    assert!(matches!(err, NCAError::InsufficientData { subject, .. } if subject == "X"));
}
