//! Thin complex QR by classical Gram-Schmidt with reorthogonalization
//!
//! Each column is projected twice ("twice is enough") against the columns
//! already accepted and, for [`qr_against`], against a fixed orthonormal
//! basis. Columns whose residual is numerically null are replaced by a
//! deterministic completion vector with a zero diagonal entry in `R`, so `Q`
//! always has orthonormal columns even for rank-deficient input.

use crate::dense::{all_finite, completion_vector, conj_transpose, hstack, norm};
use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{s, Array2, ArrayView2};
use scirs2_core::numeric::Complex64;

/// Residual norms at or below this multiple of `ε·‖a_j‖` count as null
const NULL_DIRECTION_FACTOR: f64 = 1e4;

/// Thin QR factors `A = Q R`
#[derive(Debug, Clone)]
pub struct QrDecomp {
    /// `m×n` with orthonormal columns
    pub q: Array2<Complex64>,
    /// `n×n` upper triangular
    pub r: Array2<Complex64>,
}

impl QrDecomp {
    /// `Q R`
    pub fn reconstruct(&self) -> Array2<Complex64> {
        self.q.dot(&self.r)
    }
}

/// Thin QR of an `m×n` matrix with `n ≤ m`
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array2;
/// use scirs2_core::numeric::Complex64;
/// use specrso_kernels::{orthogonality_error, qr};
///
/// let a = Array2::from_shape_fn((4, 2), |(i, j)| Complex64::new((i + j) as f64, i as f64));
/// let qr = qr(&a.view()).unwrap();
/// assert!(orthogonality_error(&qr.q.view()) < 1e-12);
/// ```
pub fn qr(a: &ArrayView2<'_, Complex64>) -> KernelResult<QrDecomp> {
    qr_against(None, a)
}

/// Thin QR of `(I - B Bᴴ) A` whose `Q` is also orthogonal to `B`
///
/// `basis` must have orthonormal columns and `basis.ncols() + a.ncols()`
/// must not exceed `a.nrows()`. The components of `A` along `B` are
/// discarded; `[B, Q]` has orthonormal columns on return.
pub fn qr_against(
    basis: Option<&ArrayView2<'_, Complex64>>,
    a: &ArrayView2<'_, Complex64>,
) -> KernelResult<QrDecomp> {
    let (m, n) = a.dim();
    let k = basis.map_or(0, |b| b.ncols());

    if let Some(b) = basis {
        if b.nrows() != m {
            return Err(KernelError::dimension_mismatch(
                "qr_against",
                format!("basis has {} rows, matrix has {}", b.nrows(), m),
            ));
        }
    }
    if k + n > m {
        return Err(KernelError::dimension_mismatch(
            "qr",
            format!("{} basis + {} new columns exceed {} rows", k, n, m),
        ));
    }
    if !all_finite(a.iter()) {
        return Err(KernelError::NonFinite { operation: "qr" });
    }

    let basis_adjoint = basis.map(conj_transpose);
    let mut q = Array2::<Complex64>::zeros((m, n));
    let mut r = Array2::<Complex64>::zeros((n, n));

    for j in 0..n {
        let mut v = a.column(j).to_owned();
        let original = norm(v.view());

        for _ in 0..2 {
            if let (Some(b), Some(bh)) = (basis, basis_adjoint.as_ref()) {
                let coeffs = bh.dot(&v);
                v -= &b.dot(&coeffs);
            }
            if j > 0 {
                let accepted = q.slice(s![.., ..j]);
                let coeffs = conj_transpose(&accepted).dot(&v);
                v -= &accepted.dot(&coeffs);
                let mut rcol = r.slice_mut(s![..j, j]);
                rcol += &coeffs;
            }
        }

        let length = norm(v.view());
        if length > 0.0 && length > original * NULL_DIRECTION_FACTOR * f64::EPSILON {
            r[[j, j]] = Complex64::new(length, 0.0);
            q.column_mut(j).assign(&v.mapv(|z| z / length));
        } else {
            let accepted = q.slice(s![.., ..j]);
            let span = match basis {
                Some(b) => hstack(b, &accepted)?,
                None => accepted.to_owned(),
            };
            q.column_mut(j).assign(&completion_vector(&span.view())?);
        }
    }

    Ok(QrDecomp { q, r })
}
