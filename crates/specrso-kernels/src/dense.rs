//! Small dense complex helpers shared by the factorizations
//!
//! Inner products follow the physics convention `⟨a, b⟩ = aᴴ b`
//! (conjugate-linear in the first argument).

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray::concatenate;
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use scirs2_core::numeric::Complex64;

/// `Aᴴ`
pub fn conj_transpose(a: &ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    a.t().mapv(|z| z.conj())
}

/// Elementwise conjugate
pub fn conj(a: &ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    a.mapv(|z| z.conj())
}

/// `aᴴ b`
pub fn inner(a: ArrayView1<'_, Complex64>, b: ArrayView1<'_, Complex64>) -> Complex64 {
    a.iter()
        .zip(b.iter())
        .fold(Complex64::new(0.0, 0.0), |acc, (x, y)| acc + x.conj() * y)
}

/// Euclidean norm of a complex vector
pub fn norm(a: ArrayView1<'_, Complex64>) -> f64 {
    frobenius_norm(a.iter())
}

/// Frobenius norm over any collection of complex values
pub fn frobenius_norm<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a Complex64>,
{
    values.into_iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Whether every entry is finite
pub fn all_finite<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a Complex64>,
{
    values.into_iter().all(|z| z.re.is_finite() && z.im.is_finite())
}

/// `[A, B]` (column concatenation)
pub fn hstack(
    a: &ArrayView2<'_, Complex64>,
    b: &ArrayView2<'_, Complex64>,
) -> KernelResult<Array2<Complex64>> {
    concatenate(Axis(1), &[a.view(), b.view()])
        .map_err(|e| KernelError::dimension_mismatch("hstack", e.to_string()))
}

/// Orthogonality error `‖QᴴQ - I‖_F / √k` of a matrix with `k` columns
///
/// 0 means perfectly orthonormal columns.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array2;
/// use scirs2_core::numeric::Complex64;
/// use specrso_kernels::orthogonality_error;
///
/// let mut q = Array2::<Complex64>::zeros((4, 2));
/// q[[0, 0]] = Complex64::new(0.0, 1.0);
/// q[[3, 1]] = Complex64::new(1.0, 0.0);
/// assert!(orthogonality_error(&q.view()) < 1e-15);
/// ```
pub fn orthogonality_error(q: &ArrayView2<'_, Complex64>) -> f64 {
    let k = q.ncols();
    if k == 0 {
        return 0.0;
    }

    let gram = conj_transpose(q).dot(q);
    let mut error_sq = 0.0;
    for ((i, j), value) in gram.indexed_iter() {
        let expected = if i == j { 1.0 } else { 0.0 };
        error_sq += (value - Complex64::new(expected, 0.0)).norm_sqr();
    }
    error_sq.sqrt() / (k as f64).sqrt()
}

/// Remove the components of `v` along the orthonormal columns of `basis`
///
/// Two classical Gram-Schmidt passes. Returns the accumulated coefficients
/// `basisᴴ v` of the original vector.
pub fn project_out(basis: &ArrayView2<'_, Complex64>, v: &mut Array1<Complex64>) -> Array1<Complex64> {
    let mut total = Array1::zeros(basis.ncols());
    if basis.ncols() == 0 {
        return total;
    }

    let adjoint = conj_transpose(basis);
    for _ in 0..2 {
        let coeffs = adjoint.dot(&*v);
        *v -= &basis.dot(&coeffs);
        total += &coeffs;
    }
    total
}

/// A unit vector orthogonal to every column of `basis`
///
/// Scans the canonical vectors in order and returns the first whose
/// projection keeps at least half its length; falls back to the best one
/// seen. Deterministic, so repeated runs pick the same completion.
pub fn completion_vector(basis: &ArrayView2<'_, Complex64>) -> KernelResult<Array1<Complex64>> {
    let (m, k) = basis.dim();
    if k >= m {
        return Err(KernelError::dimension_mismatch(
            "completion_vector",
            format!("basis with {} columns already spans C^{}", k, m),
        ));
    }

    let mut best: Option<(f64, Array1<Complex64>)> = None;
    for e in 0..m {
        let mut v = Array1::zeros(m);
        v[e] = Complex64::new(1.0, 0.0);
        project_out(basis, &mut v);

        let length = norm(v.view());
        if length > 0.5 {
            return Ok(v.mapv(|z| z / length));
        }
        if best.as_ref().map_or(true, |(l, _)| length > *l) {
            best = Some((length, v));
        }
    }

    match best {
        Some((length, v)) if length > 0.0 => {
            let mut v = v.mapv(|z| z / length);
            // One more pass after normalizing a short vector
            project_out(basis, &mut v);
            let length = norm(v.view());
            Ok(v.mapv(|z| z / length))
        }
        _ => Err(KernelError::dimension_mismatch(
            "completion_vector",
            "no direction orthogonal to basis",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_inner_is_conjugate_linear_in_first_argument() {
        let a = Array1::from(vec![c(0.0, 1.0), c(1.0, 0.0)]);
        let b = Array1::from(vec![c(0.0, 1.0), c(2.0, 0.0)]);
        // conj(i)*i + 1*2 = 1 + 2
        assert_eq!(inner(a.view(), b.view()), c(3.0, 0.0));
    }

    #[test]
    fn test_norms() {
        let a = Array1::from(vec![c(3.0, 4.0), c(0.0, 0.0)]);
        assert!((norm(a.view()) - 5.0).abs() < 1e-15);
        assert!(all_finite(a.iter()));
        let bad = Array1::from(vec![c(f64::NAN, 0.0)]);
        assert!(!all_finite(bad.iter()));
    }

    #[test]
    fn test_project_out_removes_basis_components() {
        let mut basis = Array2::zeros((3, 1));
        basis[[0, 0]] = c(0.0, 1.0);
        let mut v = Array1::from(vec![c(2.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]);

        let coeffs = project_out(&basis.view(), &mut v);
        assert!((coeffs[0] - c(0.0, -2.0)).norm() < 1e-15);
        assert!(v[0].norm() < 1e-15);
        assert_eq!(v[1], c(1.0, 1.0));
    }

    #[test]
    fn test_completion_vector_is_orthogonal() {
        let mut basis = Array2::zeros((3, 2));
        basis[[0, 0]] = c(1.0, 0.0);
        basis[[1, 1]] = c(0.0, 1.0);

        let v = completion_vector(&basis.view()).unwrap();
        assert!((norm(v.view()) - 1.0).abs() < 1e-14);
        assert!(inner(basis.column(0), v.view()).norm() < 1e-14);
        assert!(inner(basis.column(1), v.view()).norm() < 1e-14);
        assert!((v[2].norm() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_completion_vector_rejects_full_basis() {
        let mut basis = Array2::zeros((2, 2));
        basis[[0, 0]] = c(1.0, 0.0);
        basis[[1, 1]] = c(1.0, 0.0);
        assert!(completion_vector(&basis.view()).is_err());
    }

    #[test]
    fn test_hstack() {
        let a = Array2::<Complex64>::zeros((3, 1));
        let b = Array2::<Complex64>::ones((3, 2));
        let ab = hstack(&a.view(), &b.view()).unwrap();
        assert_eq!(ab.dim(), (3, 3));
        assert_eq!(ab[[2, 2]], c(1.0, 0.0));
    }
}
