//! # flow-modes
//!
//! Reduced-order modal analysis of spatiotemporal snapshot data.
//!
//! - **POD** ([`pod()`]): rank-truncated thin SVD giving orthonormal spatial
//!   modes, singular values and temporal modes, with projection and
//!   reconstruction
//! - **DMD** ([`dmd()`], [`dmd_pair`]): reduced linear operator on the leading
//!   SVD subspace, its eigenvalues as continuous-time growth rates and
//!   frequencies, and least-squares amplitudes for continuous-time prediction
//! - **Analysis** ([`dmd_spectrum`], [`dmd_error`]): per-mode stability table and
//!   reconstruction error
//! - **Synthetic data** ([`generate_test_data`]) and **export** ([`io`])
//!
//! Rows of a snapshot matrix are flattened spatial degrees of freedom
//! (several field components may be stacked); columns are time-ordered
//! snapshots. Results are immutable values, recomputed on each call.
//!
//! ## Quick Start
//!
//! ```rust
//! use flow_modes::{dmd, pod, generate_test_data};
//!
//! let x = generate_test_data(8, 8, 40, false).unwrap();
//!
//! let pod_result = pod(&x, 2).unwrap();
//! let coeffs = pod_result.temporal_coefficients();
//! assert_eq!(coeffs.nrows(), 2);
//!
//! let dmd_result = dmd(&x, 2).unwrap();
//! let x_next = dmd_result.predict(1.0);
//! assert_eq!(x_next.len(), x.nrows());
//! ```
//!
//! ## References
//!
//! - Schmid (2010), *J. Fluid Mech.*, 656, 5-28
//! - Kutz et al. (2016), *Dynamic Mode Decomposition*, SIAM
//! - Holmes, Lumley & Berkooz (1996), *Turbulence, Coherent Structures,
//!   Dynamical Systems and Symmetry*, CUP

pub mod types;

pub mod analysis;
pub mod backend;
pub mod dmd;
pub mod flow;
pub mod io;
pub mod pod;
pub mod utils;

pub use analysis::{dmd_error, dmd_spectrum};
pub use backend::{FaerBackend, LinalgBackend};
pub use dmd::{dmd, dmd_pair, dmd_pair_with, dmd_with};
pub use flow::{generate_test_data, FlowParams};
pub use io::{
    export_dmd, export_pod, read_complex_velocity_field, read_velocity_field,
    write_complex_velocity_field, write_velocity_field, FieldHeader,
};
pub use pod::{pod, pod_rank_sweep, pod_with};
pub use types::{
    ComplexMat, DmdOptions, DmdResult, EigenDecomposition, ErrorMetrics, ModalError,
    ModalResult, ModeInfo, PodResult, RankSummary, Stability, SvdComponents, C64,
};
