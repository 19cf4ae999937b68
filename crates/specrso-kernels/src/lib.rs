//! # specrso-kernels
//!
//! Complex linear algebra kernels for SpecRSo.
//!
//! The subspace update of the reconstruction only ever factors small dense
//! matrices (at most `2r` columns) plus one implicit operator per run, so the
//! kernels here are compact and deterministic rather than blocked:
//!
//! - **QR** ([`qr`], [`qr_against`]): classical Gram-Schmidt with
//!   reorthogonalization; null directions are completed so `Q` is always
//!   orthonormal
//! - **SVD** ([`svd`]): one-sided Jacobi, values sorted descending
//! - **Truncated SVD** ([`truncated_svd`]): Golub-Kahan-Lanczos
//!   bidiagonalization against any [`LinearOperator`](specrso_core::LinearOperator)
//! - **Takagi** ([`takagi_vectors`]): `M = T Σ Tᵀ` for complex-symmetric
//!   `M` from its SVD, with repeated singular values handled per cluster
//! - **Helpers** ([`dense`]): inner products, norms, projections,
//!   orthogonality checks
//!
//! ## Quick Start
//!
//! ```
//! use scirs2_core::ndarray_ext::Array2;
//! use scirs2_core::numeric::Complex64;
//! use specrso_kernels::{orthogonality_error, qr, svd};
//!
//! let a = Array2::from_shape_fn((5, 3), |(i, j)| Complex64::new(i as f64, (i * j) as f64));
//!
//! let qr = qr(&a.view()).unwrap();
//! assert!(orthogonality_error(&qr.q.view()) < 1e-12);
//!
//! let svd = svd(&a.view()).unwrap();
//! assert!(svd.s[0] >= svd.s[1] && svd.s[1] >= svd.s[2]);
//! ```
//!
//! ## SciRS2 Integration
//!
//! Arrays, complex scalars and the seeded RNG come from `scirs2-core`.

#![deny(warnings)]

pub mod dense;
pub mod error;
pub mod lanczos;
pub mod qr;
pub mod svd;
pub mod takagi;


pub use dense::{
    all_finite, completion_vector, conj, conj_transpose, frobenius_norm, hstack, inner, norm,
    orthogonality_error, project_out,
};
pub use error::{KernelError, KernelResult};
pub use lanczos::{truncated_svd, SolverInfo, TruncatedSvd};
pub use qr::{qr, qr_against, QrDecomp};
pub use svd::{svd, SvdDecomp};
pub use takagi::{symmetric_unitary_root, takagi_vectors};
