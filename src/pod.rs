use faer::Mat;
use tracing::{debug, trace};

use crate::backend::{FaerBackend, LinalgBackend};
use crate::types::{ModalError, ModalResult, PodResult, RankSummary};
use crate::utils::{
    ensure_finite_mat, norm2, truncate_svd, validate_len, validate_matrix, validate_rank,
};

/// Proper Orthogonal Decomposition of a snapshot matrix.
///
/// # Arguments
/// * `x` - Snapshot matrix (n_dof × n_snapshots), columns are time-ordered.
/// * `k` - Number of modes to keep, `1 ≤ k ≤ min(n_dof, n_snapshots)`.
///
/// # Algorithm
/// 1. Thin SVD: X = U Σ Vᵀ
/// 2. Keep the leading k triplets: modes = U[:, :k], Σ[:k], V[:, :k]
pub fn pod(x: &Mat<f64>, k: usize) -> ModalResult<PodResult> {
    pod_with(&FaerBackend, x, k)
}

/// [`pod`] with an explicit linear-algebra backend.
pub fn pod_with<B: LinalgBackend + ?Sized>(
    backend: &B,
    x: &Mat<f64>,
    k: usize,
) -> ModalResult<PodResult> {
    validate_matrix(x, 1, 1)?;
    validate_rank(k, x.nrows().min(x.ncols()))?;
    debug!(rows = x.nrows(), cols = x.ncols(), rank = k, "computing POD");

    let svd = backend.thin_svd(x)?;
    ensure_finite_mat("left singular vectors", &svd.u)?;
    ensure_finite_mat("right singular vectors", &svd.v)?;
    if svd.s.iter().any(|s| !s.is_finite()) {
        return Err(ModalError::NumericalFailure(
            "singular values contain non-finite values".into(),
        ));
    }

    let truncated = truncate_svd(&svd, k)?;
    trace!(singular_values = ?truncated.s, "POD truncated spectrum");

    Ok(PodResult {
        modes: truncated.u,
        singular_values: truncated.s,
        temporal_modes: truncated.v,
        all_singular_values: svd.s,
    })
}

impl PodResult {
    /// Number of retained modes.
    pub fn rank(&self) -> usize {
        self.singular_values.len()
    }

    /// Spatial dimension (rows of the decomposed matrix).
    pub fn n_dof(&self) -> usize {
        self.modes.nrows()
    }

    /// Number of training snapshots.
    pub fn n_snapshots(&self) -> usize {
        self.temporal_modes.nrows()
    }

    /// Modal coefficients of a spatial field: modesᵀ · data.
    pub fn project(&self, data: &[f64]) -> ModalResult<Vec<f64>> {
        validate_len("data", data.len(), self.n_dof())?;
        let coeffs: Vec<f64> = (0..self.rank())
            .map(|j| {
                data.iter()
                    .enumerate()
                    .map(|(i, d)| self.modes[(i, j)] * d)
                    .sum::<f64>()
            })
            .collect();
        Ok(coeffs)
    }

    /// Spatial field from modal coefficients: modes · coeffs.
    pub fn reconstruct(&self, coeffs: &[f64]) -> ModalResult<Vec<f64>> {
        validate_len("coefficients", coeffs.len(), self.rank())?;
        let mut field = vec![0.0; self.n_dof()];
        for (j, c) in coeffs.iter().enumerate() {
            for (i, f) in field.iter_mut().enumerate() {
                *f += self.modes[(i, j)] * c;
            }
        }
        Ok(field)
    }

    /// Temporal coefficients Σₖ · Vₖᵀ (k × n_snapshots).
    ///
    /// Row i is the time history of mode i over the training snapshots.
    pub fn temporal_coefficients(&self) -> Mat<f64> {
        Mat::from_fn(self.rank(), self.n_snapshots(), |i, j| {
            self.singular_values[i] * self.temporal_modes[(j, i)]
        })
    }

    /// Rank-k approximation of the training matrix: modes · Σₖ · Vₖᵀ.
    pub fn reconstruct_snapshots(&self) -> Mat<f64> {
        &self.modes * &self.temporal_coefficients()
    }

    /// Fraction of total energy Σσ² held by each retained mode.
    pub fn energy_fractions(&self) -> Vec<f64> {
        let total: f64 = self.all_singular_values.iter().map(|s| s * s).sum();
        if total == 0.0 {
            return vec![0.0; self.rank()];
        }
        self.singular_values.iter().map(|s| s * s / total).collect()
    }

    /// Fraction of total energy held by all retained modes together.
    pub fn cumulative_energy(&self) -> f64 {
        self.energy_fractions().iter().sum()
    }

    /// The same decomposition restricted to its first `k` modes.
    pub fn truncated(&self, k: usize) -> ModalResult<PodResult> {
        validate_rank(k, self.rank())?;
        Ok(PodResult {
            modes: self.modes.subcols(0, k).to_owned(),
            singular_values: self.singular_values[..k].to_vec(),
            temporal_modes: self.temporal_modes.subcols(0, k).to_owned(),
            all_singular_values: self.all_singular_values.clone(),
        })
    }
}

/// Compare reconstruction quality of a snapshot across several ranks.
///
/// One SVD is computed at full rank and truncated for each entry of `ranks`.
pub fn pod_rank_sweep(
    x: &Mat<f64>,
    snapshot: &[f64],
    ranks: &[usize],
) -> ModalResult<Vec<RankSummary>> {
    let full = pod(x, x.nrows().min(x.ncols()))?;
    validate_len("snapshot", snapshot.len(), full.n_dof())?;
    let snapshot_norm = norm2(snapshot);

    ranks
        .iter()
        .map(|&rank| {
            let pod_k = full.truncated(rank)?;
            let recon = pod_k.reconstruct(&pod_k.project(snapshot)?)?;
            let diff: Vec<f64> = snapshot.iter().zip(&recon).map(|(a, b)| a - b).collect();
            let err = norm2(&diff);
            let relative_error = if snapshot_norm > 0.0 {
                err / snapshot_norm
            } else {
                err
            };
            Ok(RankSummary {
                rank,
                relative_error,
                energy_captured: pod_k.cumulative_energy(),
            })
        })
        .collect()
}
