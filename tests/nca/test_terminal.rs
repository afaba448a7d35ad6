//! Tests for terminal phase (lambda_z) calculations
//!
//! Covers the best-fit point selection, the quality criteria and the options
//! that change which points may enter the regression.

use approx::assert_relative_eq;
use crossnca::data::{Group, SubjectProfile};
use crossnca::nca::{lambda_z, lambda_z_auto, LambdaZOptions, NCAOptions, NCA};

fn exponential(times: &[f64], c0: f64, k: f64) -> Vec<f64> {
    times.iter().map(|t| c0 * (-k * t).exp()).collect()
}

#[test]
fn test_lambda_z_simple_exponential() {
    // C = 100 * e^(-0.1*t), Tmax at the first sample
    let times = vec![0.0, 4.0, 8.0, 12.0, 16.0, 24.0];
    let concs = exponential(&times, 100.0, 0.1);

    let fit = lambda_z_auto(&times, &concs, &LambdaZOptions::default())
        .expect("Terminal phase should be estimated");

    assert_relative_eq!(fit.lambda_z, 0.1, epsilon = 1e-10);
    assert_relative_eq!(fit.intercept, 100.0_f64.ln(), epsilon = 1e-9);
    assert!(fit.r_squared > 0.9999);
    // Equal fit quality: the point bonus selects the longest window
    assert_eq!(fit.n_points, 5);
    assert_eq!(fit.time_first, 4.0);
    assert_eq!(fit.time_last, 24.0);
}

#[test]
fn test_lambda_z_include_tmax() {
    let times = vec![0.0, 4.0, 8.0, 12.0, 16.0, 24.0];
    let concs = exponential(&times, 100.0, 0.1);

    let options = LambdaZOptions {
        include_tmax: true,
        ..Default::default()
    };
    let fit = lambda_z(&times, &concs, 0, 5, &options).unwrap();

    assert_eq!(fit.n_points, 6);
    assert_eq!(fit.time_first, 0.0);
    assert_relative_eq!(fit.lambda_z, 0.1, epsilon = 1e-10);
}

#[test]
fn test_lambda_z_max_points() {
    let times = vec![0.0, 4.0, 8.0, 12.0, 16.0, 24.0];
    let concs = exponential(&times, 100.0, 0.1);

    let options = LambdaZOptions {
        max_points: Some(4),
        ..Default::default()
    };
    let fit = lambda_z_auto(&times, &concs, &options).unwrap();

    assert_eq!(fit.n_points, 4);
    assert_eq!(fit.time_first, 8.0);

    // Three points span less than two half-lives
    let options = LambdaZOptions {
        max_points: Some(3),
        ..Default::default()
    };
    assert!(lambda_z_auto(&times, &concs, &options).is_none());
}

#[test]
fn test_lambda_z_prefers_terminal_window_over_distribution_phase() {
    // Fast distribution until t = 2, then a clean terminal phase with k = 0.2
    let times = vec![0.0, 0.5, 1.0, 2.0, 4.0, 6.0, 8.0, 12.0];
    let mut concs = exponential(&times, 40.0, 0.2);
    concs[1] = 80.0;
    concs[2] = 60.0;
    concs[0] = 0.0;

    let fit = lambda_z_auto(&times, &concs, &LambdaZOptions::default()).unwrap();

    assert_relative_eq!(fit.lambda_z, 0.2, epsilon = 1e-10);
    assert_eq!(fit.time_first, 2.0);
    assert_eq!(fit.time_last, 12.0);
}

#[test]
fn test_lambda_z_too_few_points() {
    // Only two points after Tmax
    let times = vec![0.0, 1.0, 2.0, 3.0];
    let concs = vec![0.0, 10.0, 5.0, 2.5];

    assert!(lambda_z_auto(&times, &concs, &LambdaZOptions::default()).is_none());
}

#[test]
fn test_lambda_z_rejects_rising_terminal_phase() {
    let times = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let concs = vec![0.0, 10.0, 2.0, 3.0, 4.0, 5.0];

    // Tmax stays at t = 1, the points after it rise again
    assert!(lambda_z_auto(&times, &concs, &LambdaZOptions::default()).is_none());
}

#[test]
fn test_lambda_z_min_r_squared() {
    let times = vec![0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 12.0];
    let concs = vec![0.0, 20.0, 14.0, 9.0, 7.5, 3.0, 2.2];

    let loose = LambdaZOptions {
        min_r_squared: 0.5,
        ..Default::default()
    };
    let strict = LambdaZOptions {
        min_r_squared: 0.9999,
        ..Default::default()
    };

    let fit = lambda_z_auto(&times, &concs, &loose).expect("noisy data still fits loosely");
    assert!(fit.r_squared >= 0.5 && fit.r_squared < 0.9999);
    assert!(lambda_z_auto(&times, &concs, &strict).is_none());
}

#[test]
fn test_lambda_z_span_ratio() {
    // k = 0.01 gives t½ ≈ 69 h, far longer than the 1.5 h sampled
    let times = vec![0.0, 1.0, 10.0, 10.5, 11.0, 11.5];
    let mut concs = exponential(&times, 50.0, 0.01);
    concs[0] = 0.0;
    concs[1] = 60.0;

    assert!(lambda_z_auto(&times, &concs, &LambdaZOptions::default()).is_none());

    let relaxed = LambdaZOptions {
        min_span_ratio: 0.0,
        ..Default::default()
    };
    let fit = lambda_z_auto(&times, &concs, &relaxed).unwrap();
    assert!(fit.span_ratio < 2.0);
    assert_relative_eq!(fit.lambda_z, 0.01, epsilon = 1e-9);
}

#[test]
fn test_half_life_through_nca() {
    let times = vec![0.0, 0.5, 1.0, 2.0, 4.0, 8.0, 12.0];
    let mut concs = exponential(&times, 30.0, 0.25);
    concs[0] = 0.0;
    concs[1] = 35.0;

    let profile = SubjectProfile {
        subject: "7".to_string(),
        group: Group::Inducer,
        times,
        concentrations: concs,
        dose: Some(500.0),
    };
    let record = profile.nca(&NCAOptions::default()).unwrap();

    assert_eq!(record.tmax, 0.5);
    assert_relative_eq!(
        record.half_life.unwrap(),
        std::f64::consts::LN_2 / 0.25,
        epsilon = 1e-9
    );
    let reg = record.regression.unwrap();
    assert_eq!(reg.time_last, 12.0);
    assert!(reg.adj_r_squared > 0.9999);
}
