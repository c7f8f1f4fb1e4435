//! Dense linear-algebra capabilities used by POD and DMD.
//!
//! The decompositions only need three primitives: a thin SVD, a general
//! (non-symmetric) real eigendecomposition and a complex minimum-norm least
//! squares solve. [`LinalgBackend`] names them so an alternative
//! implementation can be swapped in; [`FaerBackend`] is the default.

use faer::Mat;

use crate::types::{ComplexMat, EigenDecomposition, ModalError, ModalResult, SvdComponents, C64};
use crate::utils::pinv;

/// Dense linear-algebra primitives.
pub trait LinalgBackend {
    /// Economy-size SVD with singular values in non-increasing order.
    fn thin_svd(&self, x: &Mat<f64>) -> ModalResult<SvdComponents>;

    /// Eigenvalues and right eigenvectors of a real square matrix.
    fn eigen(&self, a: &Mat<f64>) -> ModalResult<EigenDecomposition>;

    /// Least-squares solution of `a · x ≈ b`, minimum-norm when underdetermined.
    fn lstsq(&self, a: &ComplexMat, b: &[C64]) -> ModalResult<Vec<C64>>;
}

/// Backend built on `faer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerBackend;

impl LinalgBackend for FaerBackend {
    fn thin_svd(&self, x: &Mat<f64>) -> ModalResult<SvdComponents> {
        let svd = x
            .thin_svd()
            .map_err(|e| ModalError::NumericalFailure(format!("SVD did not converge: {e:?}")))?;
        let s_col = svd.S().column_vector();
        let s: Vec<f64> = (0..s_col.nrows()).map(|i| s_col[i]).collect();

        Ok(SvdComponents {
            u: svd.U().to_owned(),
            s,
            v: svd.V().to_owned(),
        })
    }

    fn eigen(&self, a: &Mat<f64>) -> ModalResult<EigenDecomposition> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(ModalError::InvalidArgument(format!(
                "eigendecomposition needs a square matrix, got {}x{}",
                n,
                a.ncols()
            )));
        }

        let eigen = a.as_ref().eigen().map_err(|e| {
            ModalError::NumericalFailure(format!("eigendecomposition failed: {e:?}"))
        })?;
        let values_diag = eigen.S().column_vector();
        let vectors = eigen.U();

        let mut values = Vec::with_capacity(n);
        let mut w = ComplexMat::zeros(n, n);
        for j in 0..n {
            let ev = values_diag[j];
            values.push(C64::new(ev.re, ev.im));
            for i in 0..n {
                let v = vectors[(i, j)];
                w.set(i, j, C64::new(v.re, v.im));
            }
        }

        Ok(EigenDecomposition { values, vectors: w })
    }

    fn lstsq(&self, a: &ComplexMat, b: &[C64]) -> ModalResult<Vec<C64>> {
        let (m, n) = (a.nrows(), a.ncols());
        if b.len() != m {
            return Err(ModalError::InvalidArgument(format!(
                "right-hand side has length {}, expected {m}",
                b.len()
            )));
        }

        // Real embedding of the complex system:
        // [Re A  -Im A] [Re x]   [Re b]
        // [Im A   Re A] [Im x] = [Im b]
        let embedded = Mat::<f64>::from_fn(2 * m, 2 * n, |i, j| {
            let (bi, bj) = (i / m, j / n);
            let (ii, jj) = (i % m, j % n);
            match (bi, bj) {
                (0, 0) | (1, 1) => a.re[(ii, jj)],
                (0, 1) => -a.im[(ii, jj)],
                _ => a.im[(ii, jj)],
            }
        });
        let pinv_embedded = pinv(&embedded, None)?;

        let mut x = vec![C64::zero(); n];
        for (k, xk) in x.iter_mut().enumerate() {
            let (mut re, mut im) = (0.0, 0.0);
            for (i, bi) in b.iter().enumerate() {
                re += pinv_embedded[(k, i)] * bi.re + pinv_embedded[(k, m + i)] * bi.im;
                im += pinv_embedded[(n + k, i)] * bi.re + pinv_embedded[(n + k, m + i)] * bi.im;
            }
            *xk = C64::new(re, im);
        }

        Ok(x)
    }
}
