//! Edge case and property tests on the synthetic flow.

use approx::assert_abs_diff_eq;
use flow_modes::*;

/// Spatial sinusoid modulated by cos/sin of a known angular frequency.
fn make_standing_wave(n_dof: usize, n_time: usize, omega0: f64, sigma: f64) -> faer::Mat<f64> {
    faer::Mat::from_fn(n_dof, n_time, |i, j| {
        let x = i as f64 / n_dof as f64 * std::f64::consts::TAU;
        let t = j as f64;
        let envelope = (sigma * t).exp();
        (x.sin() * (omega0 * t).cos() + (2.0 * x).cos() * (omega0 * t).sin()) * envelope
    })
}

// ============================================================================
// POD on the synthetic flow
// ============================================================================

#[test]
fn pod_flow_64x50_rank_4() {
    // 2 * 4 * 8 = 64 rows
    let x = generate_test_data(4, 8, 50, false).unwrap();
    assert_eq!(x.nrows(), 64);

    let result = pod(&x, 4).unwrap();
    assert_eq!(result.singular_values.len(), 4);
    assert_eq!(result.modes.nrows(), 64);
    assert_eq!(result.modes.ncols(), 4);
    for w in result.singular_values.windows(2) {
        assert!(w[0] >= w[1]);
    }

    // The cellular flow is a rotation of two patterns: rank 2.
    assert!(result.singular_values[1] > 1.0);
    assert!(result.singular_values[2] < 1e-8 * result.singular_values[0]);
    assert_abs_diff_eq!(result.truncated(2).unwrap().cumulative_energy(), 1.0, epsilon = 1e-12);
}

#[test]
fn pod_flow_modes_orthonormal() {
    let x = generate_test_data(4, 8, 50, true).unwrap();
    let result = pod(&x, 2).unwrap();
    let gram = result.modes.transpose() * &result.modes;
    for i in 0..2 {
        for j in 0..2 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(gram[(i, j)], expected, epsilon = 1e-8);
        }
    }
}

#[test]
fn pod_rank_2_reconstructs_flow() {
    let x = generate_test_data(6, 6, 30, false).unwrap();
    let result = pod(&x, 2).unwrap();
    let recon = result.reconstruct_snapshots();
    for j in 0..x.ncols() {
        for i in 0..x.nrows() {
            assert_abs_diff_eq!(recon[(i, j)], x[(i, j)], epsilon = 1e-10);
        }
    }
}

#[test]
fn pod_rank_1_minimum() {
    let x = faer::Mat::<f64>::from_fn(1, 1, |_, _| 3.0);
    let result = pod(&x, 1).unwrap();
    assert_abs_diff_eq!(result.singular_values[0], 3.0, epsilon = 1e-14);
    let coeffs = result.project(&[6.0]).unwrap();
    let back = result.reconstruct(&coeffs).unwrap();
    assert_abs_diff_eq!(back[0], 6.0, epsilon = 1e-14);
}

// ============================================================================
// DMD on the synthetic flow
// ============================================================================

#[test]
fn dmd_flow_frequency() {
    // One time unit per snapshot, τ advances 2π/49 per step.
    let x = generate_test_data(8, 8, 50, false).unwrap();
    let result = dmd(&x, 2).unwrap();
    let expected = std::f64::consts::TAU / 49.0;
    assert!(result
        .eigenvalues
        .iter()
        .any(|w| (w.im.abs() - expected).abs() < 1e-8));
}

#[test]
fn dmd_frequency_recovery() {
    let omega0 = 0.35;
    let x = make_standing_wave(40, 60, omega0, 0.0);
    let result = dmd(&x, 2).unwrap();
    assert!(result
        .eigenvalues
        .iter()
        .any(|w| (w.im.abs() - omega0).abs() < 1e-6));
}

#[test]
fn dmd_decay_recovery() {
    let x = make_standing_wave(40, 60, 0.35, -0.05);
    let result = dmd(&x, 2).unwrap();
    assert!(result
        .eigenvalues
        .iter()
        .any(|w| (w.re + 0.05).abs() < 1e-6));
}

#[test]
fn dmd_pure_decay_rank_1() {
    let x = faer::Mat::<f64>::from_fn(10, 30, |i, j| {
        ((i + 1) as f64).sqrt() * (-0.05 * j as f64).exp()
    });
    let result = dmd(&x, 1).unwrap();
    assert_abs_diff_eq!(result.eigenvalues[0].re, -0.05, epsilon = 1e-10);
    assert_abs_diff_eq!(result.eigenvalues[0].im, 0.0, epsilon = 1e-10);
}

#[test]
fn dmd_reconstruct_at_zero_matches_first_column() {
    let x = generate_test_data(8, 8, 50, true).unwrap();
    let result = dmd(&x, 2).unwrap();
    let recon = result.reconstruct(&[0.0]);
    assert_eq!(recon.ncols(), 1);
    for i in 0..x.nrows() {
        assert_abs_diff_eq!(recon.re[(i, 0)], x[(i, 0)], epsilon = 1e-8);
        assert_abs_diff_eq!(recon.im[(i, 0)], 0.0, epsilon = 1e-8);
    }
}

#[test]
fn dmd_empty_reconstruction() {
    let x = generate_test_data(4, 4, 20, false).unwrap();
    let result = dmd(&x, 2).unwrap();
    let recon = result.reconstruct(&[]);
    assert_eq!(recon.nrows(), 32);
    assert_eq!(recon.ncols(), 0);
}

#[test]
fn dmd_results_are_independent_values() {
    let x = make_standing_wave(20, 40, 0.2, 0.0);
    let first = dmd(&x, 2).unwrap();
    let y = make_standing_wave(20, 40, 0.5, -0.1);
    let second = dmd(&y, 2).unwrap();

    // Computing a new result leaves the earlier one untouched.
    assert!(first.eigenvalues.iter().all(|w| w.re.abs() < 1e-6));
    assert!(second.eigenvalues.iter().all(|w| (w.re + 0.1).abs() < 1e-6));
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn invalid_rank_rejected() {
    let x = generate_test_data(4, 4, 10, false).unwrap();
    assert!(matches!(pod(&x, 0), Err(ModalError::InvalidArgument(_))));
    assert!(matches!(pod(&x, 11), Err(ModalError::InvalidArgument(_))));
    assert!(matches!(dmd(&x, 0), Err(ModalError::InvalidArgument(_))));
    assert!(matches!(dmd(&x, 10), Err(ModalError::InvalidArgument(_))));
}

#[test]
fn vector_length_mismatch_rejected() {
    let x = generate_test_data(4, 4, 10, false).unwrap();
    let result = pod(&x, 2).unwrap();
    assert!(matches!(
        result.project(&vec![0.0; 31]),
        Err(ModalError::InvalidArgument(_))
    ));
    assert!(matches!(
        result.reconstruct(&[1.0]),
        Err(ModalError::InvalidArgument(_))
    ));
}

#[test]
fn error_messages_are_descriptive() {
    let x = generate_test_data(4, 4, 10, false).unwrap();
    let err = pod(&x, 0).unwrap_err();
    assert_eq!(err.to_string(), "invalid argument: rank 0 outside valid range 1..=10");
}

// ============================================================================
// Cross-validation: analysis and export on the same result
// ============================================================================

#[test]
fn spectrum_consistent_with_result() {
    let x = make_standing_wave(30, 50, 0.3, -0.02);
    let result = dmd(&x, 2).unwrap();
    let spec = dmd_spectrum(&result, 1e-6);
    for (m, rate) in spec.iter().zip(result.growth_rates()) {
        assert_abs_diff_eq!(m.growth_rate, rate, epsilon = 1e-15);
        assert_eq!(m.stability, Stability::Decaying);
    }
    for (m, f) in spec.iter().zip(result.frequencies()) {
        assert_abs_diff_eq!(m.frequency, f, epsilon = 1e-15);
    }
}

#[test]
fn binary_round_trip_of_reconstruction() {
    let dir = tempfile::tempdir().unwrap();
    let (nx, ny) = (4, 4);
    let x = generate_test_data(nx, ny, 12, true).unwrap();
    let result = dmd(&x, 2).unwrap();
    let times: Vec<f64> = (0..12).map(|t| t as f64).collect();
    let recon = result.reconstruct(&times);

    let path = dir.path().join("recon.bin");
    write_complex_velocity_field(&path, &recon, nx, ny).unwrap();
    let (header, back) = read_complex_velocity_field(&path).unwrap();
    assert_eq!(header.n_snapshots, 12);
    for j in 0..12 {
        for i in 0..32 {
            assert_eq!(back.get(i, j), recon.get(i, j));
        }
    }
}
