use faer::Mat;

use crate::types::{ComplexMat, ModalError, ModalResult, SvdComponents, C64};

/// Validate that a matrix meets minimum dimension requirements and contains no NaN/Inf.
pub fn validate_matrix(x: &Mat<f64>, min_rows: usize, min_cols: usize) -> ModalResult<()> {
    let (rows, cols) = (x.nrows(), x.ncols());
    if rows < min_rows {
        return Err(ModalError::InvalidArgument(format!(
            "matrix has {rows} rows, need at least {min_rows}"
        )));
    }
    if cols < min_cols {
        return Err(ModalError::InvalidArgument(format!(
            "matrix has {cols} columns, need at least {min_cols}"
        )));
    }
    for j in 0..cols {
        for i in 0..rows {
            if !x[(i, j)].is_finite() {
                return Err(ModalError::InvalidArgument(
                    "matrix contains NaN or Inf values".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Check that a requested rank lies in `1..=available`.
///
/// Out-of-range ranks are rejected, never clamped.
pub fn validate_rank(rank: usize, available: usize) -> ModalResult<()> {
    if rank == 0 || rank > available {
        return Err(ModalError::InvalidArgument(format!(
            "rank {rank} outside valid range 1..={available}"
        )));
    }
    Ok(())
}

/// Check that a vector length matches an expected dimension.
pub fn validate_len(what: &str, len: usize, expected: usize) -> ModalResult<()> {
    if len != expected {
        return Err(ModalError::InvalidArgument(format!(
            "{what} has length {len}, expected {expected}"
        )));
    }
    Ok(())
}

pub fn ensure_finite_mat(what: &str, m: &Mat<f64>) -> ModalResult<()> {
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            if !m[(i, j)].is_finite() {
                return Err(ModalError::NumericalFailure(format!(
                    "{what} contains non-finite values"
                )));
            }
        }
    }
    Ok(())
}

pub fn ensure_finite_complex(what: &str, m: &ComplexMat) -> ModalResult<()> {
    if !m.is_finite() {
        return Err(ModalError::NumericalFailure(format!(
            "{what} contains non-finite values"
        )));
    }
    Ok(())
}

pub fn ensure_finite_values(what: &str, values: &[C64]) -> ModalResult<()> {
    if let Some(i) = values.iter().position(|z| !z.is_finite()) {
        return Err(ModalError::NumericalFailure(format!(
            "{what}[{i}] is non-finite ({})",
            values[i]
        )));
    }
    Ok(())
}

/// Keep the leading `rank` singular triplets.
pub fn truncate_svd(svd: &SvdComponents, rank: usize) -> ModalResult<SvdComponents> {
    validate_rank(rank, svd.rank())?;
    Ok(SvdComponents {
        u: svd.u.subcols(0, rank).to_owned(),
        s: svd.s[..rank].to_vec(),
        v: svd.v.subcols(0, rank).to_owned(),
    })
}

/// Compute the Moore-Penrose pseudo-inverse via thin SVD.
pub fn pinv(a: &Mat<f64>, tol: Option<f64>) -> ModalResult<Mat<f64>> {
    let svd = a
        .thin_svd()
        .map_err(|e| ModalError::NumericalFailure(format!("SVD did not converge: {e:?}")))?;
    let u = svd.U();
    let s_col = svd.S().column_vector();
    let v = svd.V();

    let k = s_col.nrows();
    let max_sv = (0..k).map(|i| s_col[i].abs()).fold(0.0_f64, f64::max);

    let tol = tol.unwrap_or_else(|| {
        let max_dim = a.nrows().max(a.ncols()) as f64;
        max_sv * max_dim * f64::EPSILON
    });

    // pinv(A) = V S_inv U^T
    let m = a.nrows();
    let n = a.ncols();
    let mut result = Mat::<f64>::zeros(n, m);

    for idx in 0..k {
        let si = s_col[idx];
        if si.abs() > tol {
            let si_inv = 1.0 / si;
            for i in 0..m {
                let w = si_inv * u[(i, idx)];
                for j in 0..n {
                    result[(j, i)] += v[(j, idx)] * w;
                }
            }
        }
    }

    Ok(result)
}

/// Column j of a real matrix.
pub fn column(x: &Mat<f64>, j: usize) -> Vec<f64> {
    (0..x.nrows()).map(|i| x[(i, j)]).collect()
}

/// Euclidean norm of a real vector.
pub fn norm2(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}
