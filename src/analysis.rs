use faer::Mat;

use crate::types::{DmdResult, ErrorMetrics, ModalError, ModalResult, ModeInfo, Stability};

/// Analyze the DMD eigenvalue spectrum.
///
/// Returns per-mode information: magnitude, frequency, growth rate,
/// half-life, and stability classification. `tol` is the band around
/// |λ| = 1 treated as neutral.
pub fn dmd_spectrum(result: &DmdResult, tol: f64) -> Vec<ModeInfo> {
    (0..result.rank())
        .map(|i| {
            let omega = result.eigenvalues[i];
            let lambda = result.discrete_eigenvalues[i];
            let frequency = omega.im / std::f64::consts::TAU;
            let period = if frequency.abs() > 1e-14 {
                1.0 / frequency.abs()
            } else {
                f64::INFINITY
            };
            let growth_rate = omega.re;
            let half_life = if growth_rate.abs() > 1e-14 {
                Some(-(2.0_f64.ln()) / growth_rate)
            } else {
                None
            };

            ModeInfo {
                index: i,
                eigenvalue: omega,
                discrete_eigenvalue: lambda,
                magnitude: lambda.norm(),
                frequency,
                period,
                growth_rate,
                half_life,
                stability: classify_eigenvalue(lambda.norm(), tol),
                amplitude: result.amplitudes[i].norm(),
            }
        })
        .collect()
}

/// Compare the real part of the DMD reconstruction against training data.
///
/// Column j of `x_original` is taken to be the state at t = j·dt.
pub fn dmd_error(result: &DmdResult, x_original: &Mat<f64>) -> ModalResult<ErrorMetrics> {
    let n_vars = x_original.nrows();
    let n_time = x_original.ncols();
    if n_vars != result.n_dof() {
        return Err(ModalError::InvalidArgument(format!(
            "x_original has {n_vars} rows, expected {}",
            result.n_dof()
        )));
    }
    if n_time == 0 {
        return Err(ModalError::InvalidArgument("x_original has no columns".into()));
    }

    let times: Vec<f64> = (0..n_time).map(|j| j as f64 * result.dt).collect();
    let recon = result.reconstruct(&times);

    let mut sum_sq = 0.0;
    let mut sum_abs = 0.0;
    let mut orig_norm_sq = 0.0;
    let mut max_imaginary = 0.0_f64;

    for k in 0..n_time {
        for i in 0..n_vars {
            let diff = recon.re[(i, k)] - x_original[(i, k)];
            sum_sq += diff * diff;
            sum_abs += diff.abs();
            orig_norm_sq += x_original[(i, k)] * x_original[(i, k)];
            max_imaginary = max_imaginary.max(recon.im[(i, k)].abs());
        }
    }

    let n_total = (n_vars * n_time) as f64;
    let relative_error = if orig_norm_sq > 0.0 {
        (sum_sq / orig_norm_sq).sqrt()
    } else {
        0.0
    };

    Ok(ErrorMetrics {
        rmse: (sum_sq / n_total).sqrt(),
        mae: sum_abs / n_total,
        relative_error,
        max_imaginary,
    })
}

fn classify_eigenvalue(magnitude: f64, tol: f64) -> Stability {
    if magnitude > 1.0 + tol {
        Stability::Growing
    } else if magnitude < 1.0 - tol {
        Stability::Decaying
    } else {
        Stability::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dmd::dmd;

    fn make_wave(n_dof: usize, n_time: usize, omega0: f64, sigma: f64) -> Mat<f64> {
        Mat::from_fn(n_dof, n_time, |i, j| {
            let x = i as f64 / n_dof as f64 * std::f64::consts::TAU;
            let t = j as f64;
            (x + omega0 * t).sin() * (sigma * t).exp()
        })
    }

    #[test]
    fn test_spectrum_neutral_oscillation() {
        let x = make_wave(20, 40, 0.5, 0.0);
        let result = dmd(&x, 2).unwrap();
        let spec = dmd_spectrum(&result, 1e-6);

        assert_eq!(spec.len(), 2);
        for m in &spec {
            assert_eq!(m.stability, Stability::Neutral);
            assert!((m.frequency.abs() - 0.5 / std::f64::consts::TAU).abs() < 1e-6);
            assert!((m.period - std::f64::consts::TAU / 0.5).abs() < 1e-4);
            assert!(m.amplitude > 0.0);
        }
    }

    #[test]
    fn test_spectrum_decaying() {
        let x = make_wave(20, 40, 0.5, -0.1);
        let result = dmd(&x, 2).unwrap();
        for m in dmd_spectrum(&result, 1e-6) {
            assert_eq!(m.stability, Stability::Decaying);
            let half_life = m.half_life.unwrap();
            assert!((half_life - 2.0_f64.ln() / 0.1).abs() < 1e-4);
        }
    }

    #[test]
    fn test_spectrum_growing() {
        let x = make_wave(20, 30, 0.5, 0.05);
        let result = dmd(&x, 2).unwrap();
        for m in dmd_spectrum(&result, 1e-6) {
            assert_eq!(m.stability, Stability::Growing);
            assert!(m.half_life.unwrap() < 0.0);
        }
    }

    #[test]
    fn test_error_small_for_exact_rank() {
        let x = make_wave(16, 30, 0.3, -0.02);
        let result = dmd(&x, 2).unwrap();
        let err = dmd_error(&result, &x).unwrap();
        assert!(err.rmse < 1e-6, "rmse = {}", err.rmse);
        assert!(err.relative_error < 1e-6);
        assert!(err.max_imaginary < 1e-6);
    }

    #[test]
    fn test_error_dimension_mismatch() {
        let x = make_wave(16, 30, 0.3, 0.0);
        let result = dmd(&x, 2).unwrap();
        let other = make_wave(15, 30, 0.3, 0.0);
        assert!(dmd_error(&result, &other).is_err());
    }
}
