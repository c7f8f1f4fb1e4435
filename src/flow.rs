//! Synthetic velocity fields for exercising the decompositions.

use std::f64::consts::PI;

use faer::Mat;

use crate::types::{ModalError, ModalResult};

/// Default grid and snapshot count for the synthetic flow.
#[derive(Debug, Clone, Copy)]
pub struct FlowParams {
    pub nx: usize,
    pub ny: usize,
    pub n_snapshots: usize,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            nx: 32,
            ny: 32,
            n_snapshots: 50,
        }
    }
}

impl FlowParams {
    /// Number of rows of the snapshot matrix: u block then v block.
    pub fn n_dof(&self) -> usize {
        2 * self.nx * self.ny
    }

    /// Physical time of snapshot `t`; the run spans [0, 2π].
    pub fn time_of(&self, t: usize) -> f64 {
        t as f64 * 2.0 * PI / (self.n_snapshots - 1) as f64
    }

    pub fn generate(&self, include_growth: bool) -> ModalResult<Mat<f64>> {
        generate_test_data(self.nx, self.ny, self.n_snapshots, include_growth)
    }
}

/// Time-dependent cellular flow on a [0, 2π]² grid.
///
/// Point (i, j) maps to row `i + j·nx` for u and `nx·ny + i + j·nx` for v:
///
/// - u = sin(x) cos(y + τ) · s(τ)
/// - v = -cos(x) sin(y + τ) · s(τ)
///
/// with τ = t·2π/(n_snapshots - 1). When `include_growth` is set,
/// s(τ) = e^{0.1τ} + e^{-0.05τ}; otherwise s = 1.
pub fn generate_test_data(
    nx: usize,
    ny: usize,
    n_snapshots: usize,
    include_growth: bool,
) -> ModalResult<Mat<f64>> {
    if nx < 2 || ny < 2 || n_snapshots < 2 {
        return Err(ModalError::InvalidArgument(format!(
            "grid {nx}x{ny} with {n_snapshots} snapshots; each must be at least 2"
        )));
    }

    let params = FlowParams { nx, ny, n_snapshots };
    let n_plane = nx * ny;
    let mut x = Mat::<f64>::zeros(params.n_dof(), n_snapshots);

    for t in 0..n_snapshots {
        let time = params.time_of(t);
        let scale = if include_growth {
            (0.1 * time).exp() + (-0.05 * time).exp()
        } else {
            1.0
        };

        for j in 0..ny {
            let y = j as f64 * 2.0 * PI / (ny - 1) as f64;
            for i in 0..nx {
                let xc = i as f64 * 2.0 * PI / (nx - 1) as f64;
                x[(i + j * nx, t)] = xc.sin() * (y + time).cos() * scale;
                x[(n_plane + i + j * nx, t)] = -xc.cos() * (y + time).sin() * scale;
            }
        }
    }

    Ok(x)
}
