//! Takagi factorization of complex-symmetric matrices from their SVD
//!
//! A complex-symmetric `M = Mᵀ` factors as `M = T Σ Tᵀ` with orthonormal `T`.
//! Given an SVD `M = P Σ Wᴴ`, each cluster `c` of equal singular values
//! satisfies `conj(W_c) = P_c S_c` with `S_c = P_cᴴ conj(W_c)` unitary and
//! symmetric, so that `M_c = σ_c P_c S_c P_cᵀ`. A symmetric root
//! `S_c = Z Zᵀ` then gives `T_c = P_c Z`.
//!
//! The real and imaginary parts of a unitary symmetric `S = X + iY` are real
//! symmetric and commute, so one real orthogonal `O` diagonalizes both:
//! `S = O D Oᵀ` with unimodular diagonal `D`, and `Z = O D^{1/2}`.
//!
//! For a singleton cluster `S` is the scalar phase `e^{iθ}` pairing `w_i`
//! with `conj(p_i)`, and `Z = e^{iθ/2}`.

use crate::dense::{all_finite, conj, conj_transpose};
use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use scirs2_core::numeric::Complex64;

/// Off-diagonal magnitude below which a pairing block is already diagonal
const DIAGONAL_TOL: f64 = 64.0 * f64::EPSILON;

/// Leading `count` Takagi vectors of a complex-symmetric matrix
///
/// `left`, `sigma` and `right` are the factors `P`, `Σ` (sorted descending)
/// and `W` of its SVD. Singular values within `√ε·σ₁` of their neighbour are
/// treated as one cluster, and a cluster cut by `count` is factored whole
/// before truncation. The result has orthonormal columns `t_i` with
/// `M conj(t_i) = σ_i t_i`.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array2;
/// use scirs2_core::numeric::Complex64;
/// use specrso_kernels::{svd, takagi_vectors};
///
/// // Symmetric with the repeated singular value 1
/// let m = Array2::from_shape_vec(
///     (2, 2),
///     vec![
///         Complex64::new(0.0, 0.0),
///         Complex64::new(1.0, 0.0),
///         Complex64::new(1.0, 0.0),
///         Complex64::new(0.0, 0.0),
///     ],
/// )
/// .unwrap();
/// let dec = svd(&m.view()).unwrap();
/// let t = takagi_vectors(&dec.u.view(), &dec.v.view(), &dec.s.view(), 2).unwrap();
///
/// // M = T Σ Tᵀ
/// let back = t.dot(&t.t());
/// for (a, b) in back.iter().zip(m.iter()) {
///     assert!((a - b).norm() < 1e-12);
/// }
/// ```
pub fn takagi_vectors(
    left: &ArrayView2<'_, Complex64>,
    right: &ArrayView2<'_, Complex64>,
    sigma: &ArrayView1<'_, f64>,
    count: usize,
) -> KernelResult<Array2<Complex64>> {
    let available = left.ncols().min(right.ncols()).min(sigma.len());
    if left.nrows() != right.nrows() || count > available {
        return Err(KernelError::dimension_mismatch(
            "takagi_vectors",
            format!(
                "left {:?}, right {:?}, {} singular values, {} vectors requested",
                left.dim(),
                right.dim(),
                sigma.len(),
                count
            ),
        ));
    }

    let gap = f64::EPSILON.sqrt() * sigma.first().copied().unwrap_or(0.0);
    let mut t = Array2::<Complex64>::zeros((left.nrows(), count));
    let mut start = 0;
    while start < count {
        let mut end = start + 1;
        while end < available && sigma[end - 1] - sigma[end] <= gap {
            end += 1;
        }

        let p = left.slice(s![.., start..end]);
        let pairing = conj_transpose(&p).dot(&conj(&right.slice(s![.., start..end])));
        let block = p.dot(&symmetric_unitary_root(&pairing.view())?);

        let keep = end.min(count) - start;
        t.slice_mut(s![.., start..start + keep])
            .assign(&block.slice(s![.., ..keep]));
        start = end;
    }
    Ok(t)
}

/// Unitary `Z` with `Z Zᵀ = S` for a unitary symmetric `S`
///
/// Inputs that are only close to unitary (a cluster cut short by a truncated
/// factorization) still yield a unitary `Z`; the diagonal of `Oᵀ S O` is
/// projected onto the unit circle.
pub fn symmetric_unitary_root(s: &ArrayView2<'_, Complex64>) -> KernelResult<Array2<Complex64>> {
    let k = s.nrows();
    if s.ncols() != k {
        return Err(KernelError::dimension_mismatch(
            "symmetric_unitary_root",
            format!("expected a square matrix, got {:?}", s.dim()),
        ));
    }
    if !all_finite(s.iter()) {
        return Err(KernelError::NonFinite {
            operation: "symmetric_unitary_root",
        });
    }

    let off_diagonal = s
        .indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, z)| z.norm())
        .fold(0.0, f64::max);
    let o = if off_diagonal <= DIAGONAL_TOL {
        Array2::<f64>::eye(k)
    } else {
        joint_eigenvectors(&s.mapv(|z| z.re), &s.mapv(|z| z.im))?
    };

    let mut z = o.mapv(|v| Complex64::new(v, 0.0));
    let d = z.t().dot(s).dot(&z);
    for (i, mut col) in z.columns_mut().into_iter().enumerate() {
        let root = unit_phase(d[[i, i]]).sqrt();
        col.mapv_inplace(|v| v * root);
    }
    Ok(z)
}

fn unit_phase(z: Complex64) -> Complex64 {
    let magnitude = z.norm();
    if magnitude > 0.0 {
        z / magnitude
    } else {
        Complex64::new(1.0, 0.0)
    }
}

/// Real orthogonal basis diagonalizing the commuting symmetric `x` and `y`
///
/// Eigenvectors of `x` are refined inside each of its eigenvalue clusters by
/// the eigenvectors of `y` restricted to that cluster.
fn joint_eigenvectors(x: &Array2<f64>, y: &Array2<f64>) -> KernelResult<Array2<f64>> {
    let k = x.nrows();
    let (lambda, vectors) = symmetric_eigen(x)?;

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| lambda[a].total_cmp(&lambda[b]));
    let tol = f64::EPSILON.sqrt() * lambda.iter().fold(1.0, |m: f64, v| m.max(v.abs()));

    let mut o = Array2::<f64>::zeros((k, k));
    let mut start = 0;
    while start < k {
        let mut end = start + 1;
        while end < k && lambda[order[end]] - lambda[order[end - 1]] <= tol {
            end += 1;
        }

        let basis = vectors.select(Axis(1), &order[start..end]);
        let block = if end - start == 1 {
            basis
        } else {
            let projected = basis.t().dot(y).dot(&basis);
            let (_, refined) = symmetric_eigen(&projected)?;
            basis.dot(&refined)
        };
        o.slice_mut(s![.., start..end]).assign(&block);
        start = end;
    }
    Ok(o)
}

fn symmetric_eigen(a: &Array2<f64>) -> KernelResult<(Array1<f64>, Array2<f64>)> {
    let symmetric = (a + &a.t()) * 0.5;
    scirs2_linalg::eigh(&symmetric.view(), None).map_err(|e| KernelError::Decomposition {
        operation: "symmetric_eigen",
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::orthogonality_error;
    use crate::qr::qr;
    use crate::svd::svd;

    fn orthonormal(m: usize, n: usize) -> Array2<Complex64> {
        let a = Array2::from_shape_fn((m, n), |(i, j)| {
            Complex64::new(
                ((i * 5 + j * 3) as f64 * 0.7).sin(),
                ((i * 2 + j * 7) as f64 * 0.3).cos(),
            )
        });
        qr(&a.view()).unwrap().q
    }

    /// `T diag(sigma) Tᵀ`
    fn symmetric_from(t: &Array2<Complex64>, sigma: &[f64]) -> Array2<Complex64> {
        let mut scaled = t.clone();
        for (mut col, &s) in scaled.columns_mut().into_iter().zip(sigma) {
            col.mapv_inplace(|z| z * s);
        }
        scaled.dot(&t.t())
    }

    fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    fn check_takagi(m: &Array2<Complex64>, rank: usize) {
        let dec = svd(&m.view()).unwrap();
        let t = takagi_vectors(&dec.u.view(), &dec.v.view(), &dec.s.view(), rank).unwrap();

        assert!(orthogonality_error(&t.view()) < 1e-12);
        // M conj(T) = T Σ
        let lhs = m.dot(&t.mapv(|z| z.conj()));
        for i in 0..rank {
            for (a, b) in lhs.column(i).iter().zip(t.column(i).iter()) {
                assert!((a - b * dec.s[i]).norm() < 1e-10);
            }
        }
        let back = symmetric_from(&t, &dec.s.to_vec()[..rank]);
        assert!(max_abs_diff(&back, m) < 1e-10);
    }

    #[test]
    fn test_distinct_singular_values() {
        let t = orthonormal(6, 3);
        check_takagi(&symmetric_from(&t, &[3.0, 2.0, 0.5]), 3);
    }

    #[test]
    fn test_repeated_singular_value() {
        let t = orthonormal(6, 3);
        check_takagi(&symmetric_from(&t, &[2.0, 2.0, 1.0]), 3);
    }

    #[test]
    fn test_fully_degenerate_spectrum() {
        let t = orthonormal(5, 3);
        check_takagi(&symmetric_from(&t, &[1.5, 1.5, 1.5]), 3);
    }

    #[test]
    fn test_cluster_cut_by_count_is_factored_whole() {
        // Leading pair is degenerate, only one vector requested
        let t = orthonormal(5, 3);
        let m = symmetric_from(&t, &[2.0, 2.0, 0.25]);
        let dec = svd(&m.view()).unwrap();
        let first = takagi_vectors(&dec.u.view(), &dec.v.view(), &dec.s.view(), 1).unwrap();

        let lhs = m.dot(&first.column(0).mapv(|z| z.conj()));
        for (a, b) in lhs.iter().zip(first.column(0).iter()) {
            assert!((a - b * 2.0).norm() < 1e-10);
        }
    }

    #[test]
    fn test_root_of_non_diagonal_unitary_symmetric() {
        // S = O diag(e^{ia}, e^{ib}) Oᵀ with a real rotation O
        let (c, s) = (0.6f64, 0.8f64);
        let o = Array2::from_shape_vec((2, 2), vec![c, -s, s, c]).unwrap();
        let d = [Complex64::from_polar(1.0, 2.5), Complex64::from_polar(1.0, -1.1)];
        let target = Array2::from_shape_fn((2, 2), |(i, j)| {
            (0..2).map(|l| d[l] * (o[[i, l]] * o[[j, l]])).sum::<Complex64>()
        });

        let z = symmetric_unitary_root(&target.view()).unwrap();
        assert!(orthogonality_error(&z.view()) < 1e-12);
        assert!(max_abs_diff(&z.dot(&z.t()), &target) < 1e-12);
    }

    #[test]
    fn test_root_rejects_non_square() {
        let s = Array2::<Complex64>::zeros((2, 3));
        assert!(symmetric_unitary_root(&s.view()).is_err());
    }
}
