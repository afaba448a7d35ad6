//! Tests for NCA parameter calculations
//!
//! Tests all derived parameters:
//! - AUCinf and the extrapolated percentage
//! - Clearance and its unit
//! - Complete records computed from a data file

use approx::assert_relative_eq;
use crossnca::data::{read_observations_from_reader, Group};
use crossnca::nca::{
    auc_extrap_pct, auc_inf, clearance, ClearanceUnit, NCAError, NCAOptions, NCA,
};

const CSV: &str = "\
ID,TAD,DV,IND,DOSE
1,0,0,0,100000
1,1,16,0,100000
1,2,4,0,100000
1,3,1,0,100000
1,4,0.25,0,100000
1,0,0,1,100000
1,1,8,1,100000
1,2,2,1,100000
1,3,0.5,1,100000
1,4,0.125,1,100000
";

#[test]
fn test_auc_inf() {
    let auc_last = 450.0; // ng*h/mL
    let c_last = 15.0; // ng/mL
    let lambda_z = 0.1; // 1/h

    // 450 + 15 / 0.1 = 600
    assert_relative_eq!(auc_inf(auc_last, c_last, lambda_z), 600.0, epsilon = 1e-10);
    assert!(auc_inf(auc_last, c_last, -0.1).is_nan());
}

#[test]
fn test_extrapolation_percent() {
    // (500 - 450) / 500 * 100 = 10%
    assert_relative_eq!(auc_extrap_pct(450.0, 500.0), 10.0, epsilon = 1e-10);
    assert!(auc_extrap_pct(450.0, 0.0).is_nan());
}

#[test]
fn test_clearance() {
    // CL = Dose / AUC = 1000 / 500
    assert_relative_eq!(clearance(1000.0, 500.0), 2.0, epsilon = 1e-10);
    assert!(clearance(1000.0, 0.0).is_nan());
    assert!(clearance(1000.0, f64::INFINITY).is_nan());
}

#[test]
fn test_records_from_data_file() {
    let observations = read_observations_from_reader(CSV.as_bytes()).unwrap();
    let table = observations.nca(&NCAOptions::default()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.clearance_unit(), ClearanceUnit::MlPerHour);

    let control = &table.records()[0];
    assert_eq!(control.subject, "1");
    assert_eq!(control.group, Group::NoInducer);
    assert_eq!(control.cmax, 16.0);
    assert_eq!(control.tmax, 1.0);
    assert_eq!(control.tlast, 4.0);
    assert_eq!(control.clast, 0.25);

    // Concentrations halve every 0.5 h after Tmax
    let lambda = 4.0_f64.ln();
    let expected_auc = 8.0 + 15.75 / lambda;
    assert_relative_eq!(control.auc_last, expected_auc, epsilon = 1e-10);
    assert_relative_eq!(control.half_life.unwrap(), 0.5, epsilon = 1e-10);

    let expected_inf = expected_auc + 0.25 / lambda;
    assert_relative_eq!(control.auc_inf.unwrap(), expected_inf, epsilon = 1e-10);
    assert_relative_eq!(
        control.clearance.unwrap(),
        100_000.0 / expected_inf,
        epsilon = 1e-8
    );

    // Half the exposure with the inducer, twice the clearance
    let induced = &table.records()[1];
    assert_eq!(induced.group, Group::Inducer);
    assert_relative_eq!(induced.auc_last, expected_auc / 2.0, epsilon = 1e-10);
    assert_relative_eq!(
        induced.clearance.unwrap(),
        2.0 * control.clearance.unwrap(),
        epsilon = 1e-8
    );
}

#[test]
fn test_clearance_rescaled_once() {
    let observations = read_observations_from_reader(CSV.as_bytes()).unwrap();
    let mut table = observations.nca(&NCAOptions::default()).unwrap();
    let ml_per_hour = table.records()[0].clearance.unwrap();

    table.rescale_clearance().unwrap();
    assert_eq!(table.clearance_unit(), ClearanceUnit::LPerHour);
    assert_relative_eq!(
        table.records()[0].clearance.unwrap(),
        ml_per_hour / 1000.0,
        epsilon = 1e-12
    );
    assert_relative_eq!(table.records()[0].clearance.unwrap(), 5.1173, epsilon = 1e-4);

    assert_eq!(
        table.rescale_clearance(),
        Err(NCAError::ClearanceAlreadyRescaled)
    );
    assert_relative_eq!(
        table.records()[0].clearance.unwrap(),
        ml_per_hour / 1000.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_missing_dose_leaves_clearance_undefined() {
    let csv = "\
ID,TAD,DV,IND,DOSE
1,0,0,0,.
1,1,16,0,.
1,2,4,0,.
1,3,1,0,.
1,4,0.25,0,.
";
    let observations = read_observations_from_reader(csv.as_bytes()).unwrap();
    let table = observations.nca(&NCAOptions::default()).unwrap();

    let record = &table.records()[0];
    assert!(record.half_life.is_some());
    assert!(record.auc_inf.is_some());
    assert_eq!(record.clearance, None);
}

#[test]
fn test_invalid_options_rejected() {
    let observations = read_observations_from_reader(CSV.as_bytes()).unwrap();
    let options = NCAOptions::default().with_min_r_squared(1.5);

    let err = observations.nca(&options).unwrap_err();
    assert!(matches!(err, NCAError::InvalidParameter { .. }));
}

#[test]
fn test_unmeasured_period_is_skipped() {
    let csv = "\
ID,TAD,DV,IND,DOSE
1,0,0,0,100000
1,1,16,0,100000
1,2,4,0,100000
1,0,.,1,100000
1,1,.,1,100000
";
    let observations = read_observations_from_reader(csv.as_bytes()).unwrap();
    let table = observations.nca(&NCAOptions::default()).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.records()[0].group, Group::NoInducer);
}

#[test]
fn test_invalid_profile_still_aborts() {
    let csv = "\
ID,TAD,DV,IND,DOSE
1,0,0,0,100000
1,1,-16,0,100000
1,2,4,0,100000
";
    let observations = read_observations_from_reader(csv.as_bytes()).unwrap();

    let err = observations.nca(&NCAOptions::default()).unwrap_err();
    assert!(matches!(err, NCAError::InvalidConcentration { .. }));
}
