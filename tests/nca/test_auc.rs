//! Tests for AUC calculation algorithms
//!
//! Tests cover:
//! - Linear trapezoidal rule
//! - Linear up / log down
//! - Edge cases (zeros, single points, etc.)

use approx::assert_relative_eq;
use crossnca::nca::{auc_last, auc_segment, AUCMethod};

#[test]
fn test_linear_trapezoidal_simple_decreasing() {
    let times = vec![0.0, 1.0, 2.0, 4.0, 8.0];
    let concs = vec![10.0, 8.0, 6.0, 4.0, 2.0];

    let auc = auc_last(&times, &concs, AUCMethod::Linear);

    // Segment 1: (10+8)/2 * 1 = 9.0
    // Segment 2: (8+6)/2 * 1 = 7.0
    // Segment 3: (6+4)/2 * 2 = 10.0
    // Segment 4: (4+2)/2 * 4 = 12.0
    assert_relative_eq!(auc, 38.0, epsilon = 1e-10);
}

#[test]
fn test_log_down_is_exact_for_exponential_decay() {
    // Half-life 2 h: C = 100 * 2^(-t/2)
    let times = vec![0.0, 2.0, 4.0, 6.0];
    let concs = vec![100.0, 50.0, 25.0, 12.5];

    let auc = auc_last(&times, &concs, AUCMethod::LinUpLogDown);

    // ∫ 100 e^(-λt) dt from 0 to 6 = (100 - 12.5) / λ, λ = ln 2 / 2
    let expected = 87.5 * 2.0 / std::f64::consts::LN_2;
    assert_relative_eq!(auc, expected, epsilon = 1e-10);
}

#[test]
fn test_linear_up_log_down_mixed_profile() {
    let times = vec![0.0, 0.5, 1.0, 2.0, 4.0, 8.0];
    let concs = vec![0.0, 5.0, 8.0, 6.0, 3.0, 1.0];

    let mixed = auc_last(&times, &concs, AUCMethod::LinUpLogDown);
    let linear = auc_last(&times, &concs, AUCMethod::Linear);

    // Rising segments identical, falling segments smaller on the log scale
    let rising = 0.5 * 5.0 / 2.0 + 0.5 * 13.0 / 2.0;
    let falling_log = 2.0 / (8.0_f64 / 6.0).ln() + 6.0 / 2.0_f64.ln() + 8.0 / 3.0_f64.ln();
    assert_relative_eq!(mixed, rising + falling_log, epsilon = 1e-10);
    assert!(mixed < linear);
}

#[test]
fn test_auc_stops_at_last_positive_concentration() {
    let times = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let concs = vec![10.0, 5.0, 0.0, 0.0, 0.0];

    let auc = auc_last(&times, &concs, AUCMethod::Linear);

    // Tlast = 1: only (10+5)/2 * 1 is integrated
    assert_relative_eq!(auc, 7.5, epsilon = 1e-10);
}

#[test]
fn test_auc_single_point() {
    assert_eq!(auc_last(&[0.0], &[10.0], AUCMethod::Linear), 0.0);
}

#[test]
fn test_auc_two_points() {
    let auc = auc_last(&[0.0, 4.0], &[10.0, 6.0], AUCMethod::Linear);
    // (10+6)/2 * 4
    assert_relative_eq!(auc, 32.0, epsilon = 1e-10);
}

#[test]
fn test_auc_empty_and_mismatched_data() {
    assert_eq!(auc_last(&[], &[], AUCMethod::LinUpLogDown), 0.0);
    assert_eq!(auc_last(&[0.0, 1.0], &[1.0], AUCMethod::LinUpLogDown), 0.0);
}

#[test]
fn test_auc_all_zero() {
    let auc = auc_last(&[0.0, 1.0, 2.0], &[0.0, 0.0, 0.0], AUCMethod::LinUpLogDown);
    assert_eq!(auc, 0.0);
}

#[test]
fn test_auc_plateau() {
    let times = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let concs = vec![5.0, 5.0, 5.0, 5.0, 5.0];

    // Equal concentrations never use the log rule
    for method in [AUCMethod::Linear, AUCMethod::LinUpLogDown] {
        assert_relative_eq!(auc_last(&times, &concs, method), 20.0, epsilon = 1e-10);
    }
}

#[test]
fn test_auc_unequal_spacing() {
    let times = vec![0.0, 0.25, 1.0, 2.5, 8.0];
    let concs = vec![100.0, 95.0, 80.0, 55.0, 20.0];

    let auc = auc_last(&times, &concs, AUCMethod::Linear);

    // 24.375 + 65.625 + 101.25 + 206.25
    assert_relative_eq!(auc, 397.5, epsilon = 1e-10);
}

#[test]
fn test_log_segment_falls_back_to_linear_at_zero() {
    let log = auc_segment(0.0, 10.0, 2.0, 0.0, AUCMethod::LinUpLogDown);
    let lin = auc_segment(0.0, 10.0, 2.0, 0.0, AUCMethod::Linear);
    assert_relative_eq!(log, lin);
    assert!(log.is_finite());
}

#[test]
fn test_segment_with_reversed_times_is_zero() {
    assert_eq!(auc_segment(2.0, 10.0, 1.0, 5.0, AUCMethod::Linear), 0.0);
    assert_eq!(auc_segment(1.0, 10.0, 1.0, 5.0, AUCMethod::LinUpLogDown), 0.0);
}

#[test]
fn test_auc_methods_comparison() {
    // For exponential decay the log rule is closer to the true area
    let k: f64 = 0.15;
    let times = vec![0.0, 1.0, 2.0, 4.0, 8.0, 12.0];
    let concs: Vec<f64> = times.iter().map(|t| 100.0 * (-k * t).exp()).collect();
    let true_auc = 100.0 / k * (1.0 - (-k * 12.0).exp());

    let error_linear = (auc_last(&times, &concs, AUCMethod::Linear) - true_auc).abs();
    let error_log = (auc_last(&times, &concs, AUCMethod::LinUpLogDown) - true_auc).abs();

    assert!(error_log < error_linear);
    assert!(error_log < 1e-9);
}
