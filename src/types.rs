use faer::Mat;

/// Error types for modal decomposition operations.
#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV failure: {0}")]
    Csv(#[from] csv::Error),
}

pub type ModalResult<T> = Result<T, ModalError>;

/// Complex number type (re, im).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct C64 {
    pub re: f64,
    pub im: f64,
}

impl C64 {
    /// Create a new complex number.
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// The zero complex number (0 + 0i).
    pub fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    /// Magnitude |z| = sqrt(re² + im²).
    pub fn norm(&self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Phase angle atan2(im, re), in (-π, π].
    ///
    /// A signed zero imaginary part is treated as +0, so the negative real
    /// axis maps to +π rather than -π.
    pub fn arg(&self) -> f64 {
        let im = if self.im == 0.0 { 0.0 } else { self.im };
        im.atan2(self.re)
    }

    /// Principal-branch natural logarithm: ln|z| + i·arg(z).
    pub fn ln(&self) -> Self {
        Self {
            re: self.norm().ln(),
            im: self.arg(),
        }
    }

    /// Complex exponential e^{re} (cos im + i sin im).
    pub fn exp(&self) -> Self {
        let r = self.re.exp();
        let (sin, cos) = self.im.sin_cos();
        Self {
            re: r * cos,
            im: r * sin,
        }
    }

    /// True when both parts are finite.
    pub fn is_finite(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Whether z lies on the non-positive real axis (the log branch cut).
    pub fn on_branch_cut(&self) -> bool {
        self.im == 0.0 && self.re <= 0.0
    }
}

impl From<f64> for C64 {
    fn from(re: f64) -> Self {
        Self { re, im: 0.0 }
    }
}

impl std::fmt::Display for C64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.im < 0.0 { '-' } else { '+' };
        match f.precision() {
            Some(p) => write!(f, "{:.*}{sign}{:.*}i", p, self.re, p, self.im.abs()),
            None => write!(f, "{}{sign}{}i", self.re, self.im.abs()),
        }
    }
}

impl std::ops::Add for C64 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl std::ops::AddAssign for C64 {
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl std::ops::Sub for C64 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl std::ops::Mul for C64 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl std::ops::Mul<f64> for C64 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            re: self.re * rhs,
            im: self.im * rhs,
        }
    }
}

impl std::ops::Div<f64> for C64 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self {
            re: self.re / rhs,
            im: self.im / rhs,
        }
    }
}

/// Dense complex matrix stored as separate real and imaginary parts.
#[derive(Debug, Clone)]
pub struct ComplexMat {
    pub re: Mat<f64>,
    pub im: Mat<f64>,
}

impl ComplexMat {
    /// Zero matrix of the given shape.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            re: Mat::zeros(nrows, ncols),
            im: Mat::zeros(nrows, ncols),
        }
    }

    /// Lift a real matrix into the complex plane.
    pub fn from_real(re: &Mat<f64>) -> Self {
        Self {
            re: re.clone(),
            im: Mat::zeros(re.nrows(), re.ncols()),
        }
    }

    pub fn nrows(&self) -> usize {
        self.re.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.re.ncols()
    }

    /// Entry (i, j).
    pub fn get(&self, i: usize, j: usize) -> C64 {
        C64::new(self.re[(i, j)], self.im[(i, j)])
    }

    /// Set entry (i, j).
    pub fn set(&mut self, i: usize, j: usize, value: C64) {
        self.re[(i, j)] = value.re;
        self.im[(i, j)] = value.im;
    }

    /// Column j as a vector.
    pub fn column(&self, j: usize) -> Vec<C64> {
        (0..self.nrows()).map(|i| self.get(i, j)).collect()
    }

    /// Matrix-vector product with a complex vector.
    pub fn mul_vec(&self, x: &[C64]) -> Vec<C64> {
        let mut out = vec![C64::zero(); self.nrows()];
        for (j, xj) in x.iter().enumerate() {
            for (i, acc) in out.iter_mut().enumerate() {
                *acc += self.get(i, j) * *xj;
            }
        }
        out
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        (0..self.ncols()).all(|j| {
            (0..self.nrows()).all(|i| self.re[(i, j)].is_finite() && self.im[(i, j)].is_finite())
        })
    }
}

/// Components of a (possibly truncated) thin SVD.
#[derive(Debug, Clone)]
pub struct SvdComponents {
    /// Left singular vectors (m × r).
    pub u: Mat<f64>,
    /// Singular values (r), non-increasing.
    pub s: Vec<f64>,
    /// Right singular vectors (n × r), columns are right singular vectors.
    pub v: Mat<f64>,
}

impl SvdComponents {
    /// Number of singular triplets held.
    pub fn rank(&self) -> usize {
        self.s.len()
    }
}

/// Eigenvalues and eigenvectors of a real square matrix.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub values: Vec<C64>,
    /// Eigenvectors, one per column, in the order of `values`.
    pub vectors: ComplexMat,
}

/// Result of a POD computation.
#[derive(Debug, Clone)]
pub struct PodResult {
    /// Spatial modes U[:, :k] (n_dof × k), orthonormal columns.
    pub modes: Mat<f64>,
    /// Singular values Σ[:k], non-increasing.
    pub singular_values: Vec<f64>,
    /// Temporal modes V[:, :k] (n_snapshots × k), orthonormal columns.
    pub temporal_modes: Mat<f64>,
    /// Full singular-value spectrum of the decomposed matrix.
    pub all_singular_values: Vec<f64>,
}

/// Options for DMD computation.
#[derive(Debug, Clone)]
pub struct DmdOptions {
    /// Time between successive snapshots.
    pub dt: f64,
}

impl Default for DmdOptions {
    fn default() -> Self {
        Self { dt: 1.0 }
    }
}

/// Result of a DMD computation.
#[derive(Debug, Clone)]
pub struct DmdResult {
    /// DMD modes Φ = U W (n_dof × r).
    pub modes: ComplexMat,
    /// Continuous-time eigenvalues ω = ln(λ) / dt.
    pub eigenvalues: Vec<C64>,
    /// Discrete-time eigenvalues λ of the reduced operator.
    pub discrete_eigenvalues: Vec<C64>,
    /// Amplitudes b fitted to the first snapshot.
    pub amplitudes: Vec<C64>,
    /// Reduced operator Ã = Uᵀ X₂ V Σ⁻¹ (r × r).
    pub a_tilde: Mat<f64>,
    /// Truncated SVD of X₁.
    pub svd: SvdComponents,
    /// Time step.
    pub dt: f64,
}

/// Information about a single DMD mode.
#[derive(Debug, Clone)]
pub struct ModeInfo {
    /// Mode index.
    pub index: usize,
    /// Continuous-time eigenvalue ω.
    pub eigenvalue: C64,
    /// Discrete-time eigenvalue λ.
    pub discrete_eigenvalue: C64,
    /// |λ|.
    pub magnitude: f64,
    /// Oscillation frequency Im(ω) / 2π, in cycles per time unit.
    pub frequency: f64,
    /// Oscillation period, infinite for non-oscillating modes.
    pub period: f64,
    /// Growth rate Re(ω).
    pub growth_rate: f64,
    /// Half-life for decaying modes (positive), doubling time for growing (negative).
    pub half_life: Option<f64>,
    /// Stability classification.
    pub stability: Stability,
    /// Mode amplitude |b|.
    pub amplitude: f64,
}

/// Stability classification of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Decaying,
    Neutral,
    Growing,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::Decaying => write!(f, "decaying"),
            Stability::Neutral => write!(f, "neutral"),
            Stability::Growing => write!(f, "growing"),
        }
    }
}

/// One row of a POD rank comparison.
#[derive(Debug, Clone, Copy)]
pub struct RankSummary {
    pub rank: usize,
    /// ‖x - reconstruct(project(x))‖ / ‖x‖.
    pub relative_error: f64,
    /// Fraction of total energy (Σσ²) held by the first `rank` modes.
    pub energy_captured: f64,
}

/// Error metrics for reconstruction quality.
#[derive(Debug, Clone)]
pub struct ErrorMetrics {
    /// Root mean square error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Relative error (Frobenius norm ratio).
    pub relative_error: f64,
    /// Largest imaginary part magnitude in the reconstruction.
    pub max_imaginary: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_near(a: f64, b: f64, eps: f64) {
        assert!(
            (a - b).abs() < eps,
            "expected {a} ≈ {b} (diff = {})",
            (a - b).abs()
        );
    }

    #[test]
    fn test_ln_exp_inverse() {
        let z = C64::new(0.7, -1.3);
        let back = z.ln().exp();
        assert_near(back.re, z.re, 1e-14);
        assert_near(back.im, z.im, 1e-14);
    }

    #[test]
    fn test_ln_principal_branch() {
        let w = C64::new(-2.0, 0.0).ln();
        assert_near(w.re, 2.0_f64.ln(), 1e-15);
        assert_near(w.im, PI, 1e-15);

        // Negative zero imaginary part still lands on +π.
        let w = C64::new(-1.0, -0.0).ln();
        assert_near(w.im, PI, 1e-15);
        assert!(C64::new(-1.0, -0.0).on_branch_cut());
        assert!(!C64::new(-1.0, 1e-300).on_branch_cut());
    }

    #[test]
    fn test_ln_zero_is_not_finite() {
        assert!(!C64::zero().ln().is_finite());
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.2}", C64::new(1.0, -0.5)), "1.00-0.50i");
        assert_eq!(C64::new(0.25, 2.0).to_string(), "0.25+2i");
    }

    #[test]
    fn test_complex_mat_mul_vec() {
        let mut m = ComplexMat::zeros(2, 2);
        m.set(0, 0, C64::new(0.0, 1.0));
        m.set(1, 1, C64::new(2.0, 0.0));
        let y = m.mul_vec(&[C64::new(1.0, 1.0), C64::new(0.0, -1.0)]);
        assert_eq!(y[0], C64::new(-1.0, 1.0));
        assert_eq!(y[1], C64::new(0.0, -2.0));
    }
}
