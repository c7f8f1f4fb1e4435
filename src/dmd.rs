use faer::Mat;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::backend::{FaerBackend, LinalgBackend};
use crate::types::{ComplexMat, DmdOptions, DmdResult, ModalError, ModalResult, C64};
use crate::utils::{
    column, ensure_finite_complex, ensure_finite_mat, ensure_finite_values, truncate_svd,
    validate_matrix, validate_rank,
};

/// Perform Dynamic Mode Decomposition on a single snapshot matrix.
///
/// X₁ = X[:, 0..n-1] and X₂ = X[:, 1..n], then [`dmd_pair`].
pub fn dmd(x: &Mat<f64>, r: usize) -> ModalResult<DmdResult> {
    dmd_with(&FaerBackend, x, r, &DmdOptions::default())
}

/// [`dmd`] with an explicit backend and options.
pub fn dmd_with<B: LinalgBackend + ?Sized>(
    backend: &B,
    x: &Mat<f64>,
    r: usize,
    options: &DmdOptions,
) -> ModalResult<DmdResult> {
    validate_matrix(x, 1, 2)?;
    let n_time = x.ncols();
    let x1 = x.subcols(0, n_time - 1).to_owned();
    let x2 = x.subcols(1, n_time - 1).to_owned();
    dmd_pair_with(backend, &x1, &x2, r, options)
}

/// Perform Dynamic Mode Decomposition on paired snapshot matrices.
///
/// # Arguments
/// * `x1` - Snapshots at step n (m variables × n snapshots).
/// * `x2` - Snapshots at step n+1, same shape; column i follows column i of `x1`.
/// * `r` - Truncation rank, `1 ≤ r ≤ min(m, n)`.
///
/// # Algorithm
/// 1. Truncated SVD: X₁ ≈ U Σ Vᵀ
/// 2. Reduced operator: Ã = Uᵀ X₂ V Σ⁻¹
/// 3. Eigendecomposition: Ã W = W Λ
/// 4. DMD modes: Φ = U W
/// 5. Amplitudes: b = Φ⁺ x₁[:, 0]
/// 6. Continuous eigenvalues: ω = ln(λ) / dt (principal branch)
pub fn dmd_pair(x1: &Mat<f64>, x2: &Mat<f64>, r: usize) -> ModalResult<DmdResult> {
    dmd_pair_with(&FaerBackend, x1, x2, r, &DmdOptions::default())
}

/// [`dmd_pair`] with an explicit backend and options.
pub fn dmd_pair_with<B: LinalgBackend + ?Sized>(
    backend: &B,
    x1: &Mat<f64>,
    x2: &Mat<f64>,
    r: usize,
    options: &DmdOptions,
) -> ModalResult<DmdResult> {
    validate_matrix(x1, 1, 1)?;
    validate_matrix(x2, 1, 1)?;
    if x1.nrows() != x2.nrows() || x1.ncols() != x2.ncols() {
        return Err(ModalError::InvalidArgument(format!(
            "X1 is {}x{} but X2 is {}x{}",
            x1.nrows(),
            x1.ncols(),
            x2.nrows(),
            x2.ncols()
        )));
    }
    validate_rank(r, x1.nrows().min(x1.ncols()))?;
    if !(options.dt.is_finite() && options.dt > 0.0) {
        return Err(ModalError::InvalidArgument(format!(
            "time step must be positive and finite, got {}",
            options.dt
        )));
    }
    debug!(rows = x1.nrows(), cols = x1.ncols(), rank = r, dt = options.dt, "computing DMD");

    // SVD of X1, truncated to rank r
    let full_svd = backend.thin_svd(x1)?;
    let svd = truncate_svd(&full_svd, r)?;
    ensure_finite_mat("left singular vectors", &svd.u)?;
    ensure_finite_mat("right singular vectors", &svd.v)?;
    check_singular_values(&svd.s, x1.nrows().max(x1.ncols()))?;
    trace!(singular_values = ?svd.s, "DMD truncated spectrum");

    // Reduced operator: Ã = Uᵀ X₂ V Σ⁻¹
    let ut_x2 = svd.u.transpose() * x2;
    let ut_x2_v = &ut_x2 * &svd.v;
    let a_tilde = Mat::<f64>::from_fn(r, r, |i, j| ut_x2_v[(i, j)] / svd.s[j]);
    ensure_finite_mat("reduced operator", &a_tilde)?;

    let eigen = backend.eigen(&a_tilde)?;
    ensure_finite_values("discrete eigenvalues", &eigen.values)?;
    ensure_finite_complex("reduced eigenvectors", &eigen.vectors)?;

    // DMD modes: Φ = U W
    let modes = ComplexMat {
        re: &svd.u * &eigen.vectors.re,
        im: &svd.u * &eigen.vectors.im,
    };
    ensure_finite_complex("DMD modes", &modes)?;

    // Amplitudes: least-squares fit of the first snapshot
    let x0: Vec<C64> = column(x1, 0).into_iter().map(C64::from).collect();
    let amplitudes = backend.lstsq(&modes, &x0)?;
    ensure_finite_values("amplitudes", &amplitudes)?;

    let eigenvalues = continuous_eigenvalues(&eigen.values, options.dt)?;
    debug!(rank = r, "DMD complete");

    Ok(DmdResult {
        modes,
        eigenvalues,
        discrete_eigenvalues: eigen.values,
        amplitudes,
        a_tilde,
        svd,
        dt: options.dt,
    })
}

/// Σ⁻¹ needs every retained singular value to be strictly positive.
fn check_singular_values(s: &[f64], max_dim: usize) -> ModalResult<()> {
    if let Some(j) = s.iter().position(|&sj| !sj.is_finite() || sj <= 0.0) {
        return Err(ModalError::NumericalFailure(format!(
            "singular value {j} is {}; rank exceeds the numerical rank of X1",
            s[j]
        )));
    }
    let tol = s[0] * max_dim as f64 * f64::EPSILON;
    if let Some(j) = s.iter().position(|&sj| sj < tol) {
        warn!(index = j, value = s[j], tol, "retained singular value is numerically zero");
    }
    Ok(())
}

/// ω = ln(λ) / dt on the principal branch, arg ∈ (-π, π].
///
/// A negative real λ maps to Im ω = +π/dt. λ = 0 has no logarithm and is
/// reported as a numerical failure.
fn continuous_eigenvalues(discrete: &[C64], dt: f64) -> ModalResult<Vec<C64>> {
    for (i, lambda) in discrete.iter().enumerate() {
        if lambda.on_branch_cut() {
            warn!(
                index = i,
                eigenvalue = %lambda,
                "discrete eigenvalue on the non-positive real axis; using principal branch"
            );
        }
    }
    let omega: Vec<C64> = discrete.iter().map(|lambda| lambda.ln() / dt).collect();
    ensure_finite_values("continuous eigenvalues", &omega)?;
    Ok(omega)
}

impl DmdResult {
    /// Truncation rank.
    pub fn rank(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Spatial dimension of the modes.
    pub fn n_dof(&self) -> usize {
        self.modes.nrows()
    }

    /// State at continuous time t: x(t) = Φ (b ⊙ e^{ωt}).
    ///
    /// No overflow check is made. When e^{ωt} exceeds the `f64` range, for
    /// large |t| or a strongly growing or decaying mode, the affected entries
    /// come back as infinite or NaN.
    pub fn predict(&self, t: f64) -> Vec<C64> {
        let evolved: Vec<C64> = self
            .amplitudes
            .iter()
            .zip(&self.eigenvalues)
            .map(|(b, omega)| *b * (*omega * t).exp())
            .collect();
        self.modes.mul_vec(&evolved)
    }

    /// One predicted column per requested time.
    ///
    /// Columns are independent and computed in parallel. An empty slice gives
    /// an n_dof × 0 matrix.
    pub fn reconstruct(&self, timesteps: &[f64]) -> ComplexMat {
        let columns: Vec<Vec<C64>> = timesteps.par_iter().map(|&t| self.predict(t)).collect();

        let mut out = ComplexMat::zeros(self.n_dof(), timesteps.len());
        for (j, col) in columns.iter().enumerate() {
            for (i, z) in col.iter().enumerate() {
                out.set(i, j, *z);
            }
        }
        out
    }

    /// Oscillation frequencies Im(ω) / 2π, cycles per time unit.
    pub fn frequencies(&self) -> Vec<f64> {
        self.eigenvalues
            .iter()
            .map(|w| w.im / std::f64::consts::TAU)
            .collect()
    }

    /// Growth (positive) or decay (negative) rates Re(ω).
    pub fn growth_rates(&self) -> Vec<f64> {
        self.eigenvalues.iter().map(|w| w.re).collect()
    }
}
