//! Truncated SVD of a matrix-free operator by Golub-Kahan-Lanczos bidiagonalization
//!
//! Only products with the operator and its adjoint are used, so the solver
//! runs directly on the implicit Hankel lifting. The recurrence
//!
//! ```text
//! A V_k = U_k B_k
//! Aᴴ U_k = V_k B_kᴴ + β_k v_{k+1} e_kᵀ
//! ```
//!
//! builds an upper bidiagonal `B_k` whose singular triplets approximate the
//! leading ones of `A`. Both Lanczos bases are fully reorthogonalized. The
//! residual of Ritz triplet `i` is `β_k |P[k-1, i]|` where `B_k = P Σ Qᴴ`.
//!
//! The process stops once the leading `rank` residuals fall below
//! `tol · σ₁`, or after `min(rows, cols)` steps where the factorization is
//! exact. A breakdown (a vanishing `α` or `β`) restarts the recurrence with a
//! deterministic completion vector.

use crate::dense::{completion_vector, inner, norm};
use crate::error::{KernelError, KernelResult};
use crate::svd::{svd, SvdDecomp};
use scirs2_core::ndarray_ext::{s, Array1, Array2, Zip};
use scirs2_core::numeric::Complex64;
use scirs2_core::random::{Rng, SeedableRng, StdRng};
use specrso_core::LinearOperator;
use std::fmt;

/// Convergence record of an iterative SVD solve
#[derive(Debug, Clone)]
pub struct SolverInfo {
    /// Number of bidiagonalization steps performed
    pub iterations: usize,
    /// Largest Ritz residual among the returned triplets
    pub residual: f64,
    /// Whether the residual test passed
    pub converged: bool,
}

impl fmt::Display for SolverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lanczos SVD: {} in {} iterations, residual = {:.2e}",
            if self.converged {
                "converged"
            } else {
                "did not converge"
            },
            self.iterations,
            self.residual
        )
    }
}

/// Leading singular triplets of an operator
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    /// `rows×rank` left singular vectors
    pub u: Array2<Complex64>,
    /// `rank` singular values, sorted descending
    pub s: Array1<f64>,
    /// `cols×rank` right singular vectors
    pub v: Array2<Complex64>,
    /// Solver statistics
    pub info: SolverInfo,
}

impl TruncatedSvd {
    /// Drop the solver statistics
    pub fn into_decomp(self) -> SvdDecomp {
        SvdDecomp {
            u: self.u,
            s: self.s,
            v: self.v,
        }
    }
}

/// Leading `rank` singular triplets of `op`
///
/// # Arguments
///
/// - `op`: operator exposing forward and adjoint products
/// - `rank`: number of triplets, in `1..=min(rows, cols)`
/// - `tol`: relative residual tolerance (clamped below by machine epsilon)
/// - `seed`: seed of the random start vector
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array2;
/// use scirs2_core::numeric::Complex64;
/// use specrso_kernels::truncated_svd;
///
/// let a = Array2::from_shape_fn((6, 4), |(i, j)| Complex64::new((i * j) as f64, 0.0));
/// let top = truncated_svd(&a, 1, 1e-12, 7).unwrap();
/// assert_eq!(top.u.dim(), (6, 1));
/// assert!(top.s[0] > 0.0);
/// ```
pub fn truncated_svd<Op>(op: &Op, rank: usize, tol: f64, seed: u64) -> KernelResult<TruncatedSvd>
where
    Op: LinearOperator + ?Sized,
{
    let (m, n) = (op.nrows(), op.ncols());
    let kmax = m.min(n);
    if rank == 0 || rank > kmax {
        return Err(KernelError::InvalidRank {
            operation: "truncated_svd",
            rank,
            max_rank: kmax,
        });
    }

    let mut us: Vec<Array1<Complex64>> = Vec::with_capacity(kmax);
    let mut vs: Vec<Array1<Complex64>> = Vec::with_capacity(kmax + 1);
    let mut alphas: Vec<f64> = Vec::with_capacity(kmax);
    let mut betas: Vec<f64> = Vec::with_capacity(kmax);

    vs.push(start_vector(n, seed));

    let breakdown_scale = f64::EPSILON * (m.max(n) as f64).sqrt();
    let mut anorm = 0.0_f64;
    let mut next_check = rank;

    for k in 1..=kmax {
        let mut p = op.apply(vs[k - 1].view())?;
        if k > 1 {
            let beta = betas[k - 2];
            Zip::from(&mut p)
                .and(&us[k - 2])
                .for_each(|x, &u| *x -= u * beta);
        }
        reorthogonalize(&us, &mut p);

        let alpha = norm(p.view());
        anorm = anorm.max(alpha);
        if alpha > anorm * breakdown_scale && alpha > 0.0 {
            us.push(normalize_against(&us, p, alpha, anorm));
            alphas.push(alpha);
        } else {
            us.push(completion_vector(&stack(&us, m).view())?);
            alphas.push(0.0);
        }

        let alpha = alphas[k - 1];
        let mut r = op.apply_adjoint(us[k - 1].view())?;
        Zip::from(&mut r)
            .and(&vs[k - 1])
            .for_each(|x, &v| *x -= v * alpha);
        reorthogonalize(&vs, &mut r);

        if k < n {
            let beta = norm(r.view());
            anorm = anorm.max(beta);
            if beta > anorm * breakdown_scale && beta > 0.0 {
                vs.push(normalize_against(&vs, r, beta, anorm));
                betas.push(beta);
            } else {
                vs.push(completion_vector(&stack(&vs, n).view())?);
                betas.push(0.0);
            }
        } else {
            betas.push(0.0);
        }

        if k < rank || (k < kmax && k < next_check) {
            continue;
        }
        next_check = k + (k / 2).max(1);

        // At the step cap with more columns than rows, U spans every row and
        // the trailing β column completes an exact projection.
        let exact_wide = k == kmax && m < n;
        let (ritz, residual) = ritz_triplets(&us, &vs, &alphas, &betas, rank, exact_wide, m, n)?;

        let sigma_max = ritz.s[0];
        let threshold = tol.max(f64::EPSILON) * sigma_max;
        let converged = residual <= threshold;

        if converged || k == kmax {
            tracing::trace!(
                iterations = k,
                residual,
                converged,
                "truncated SVD finished"
            );
            return Ok(TruncatedSvd {
                u: ritz.u,
                s: ritz.s,
                v: ritz.v,
                info: SolverInfo {
                    iterations: k,
                    residual,
                    converged,
                },
            });
        }
    }

    Err(KernelError::InvalidRank {
        operation: "truncated_svd",
        rank,
        max_rank: kmax,
    })
}

#[allow(clippy::too_many_arguments)]
fn ritz_triplets(
    us: &[Array1<Complex64>],
    vs: &[Array1<Complex64>],
    alphas: &[f64],
    betas: &[f64],
    rank: usize,
    exact_wide: bool,
    m: usize,
    n: usize,
) -> KernelResult<(SvdDecomp, f64)> {
    let k = alphas.len();
    let cols = if exact_wide { k + 1 } else { k };

    let mut b = Array2::<Complex64>::zeros((k, cols));
    for i in 0..k {
        b[[i, i]] = Complex64::new(alphas[i], 0.0);
        if i + 1 < cols {
            b[[i, i + 1]] = Complex64::new(betas[i], 0.0);
        }
    }

    let small = svd(&b.view())?;
    let u_basis = stack(&us[..k], m);
    let v_basis = stack(&vs[..cols], n);

    let residual = if exact_wide {
        0.0
    } else {
        (0..rank)
            .map(|i| betas[k - 1] * small.u[[k - 1, i]].norm())
            .fold(0.0, f64::max)
    };

    let ritz = SvdDecomp {
        u: u_basis.dot(&small.u.slice(s![.., ..rank])),
        s: small.s.slice(s![..rank]).to_owned(),
        v: v_basis.dot(&small.v.slice(s![.., ..rank])),
    };
    Ok((ritz, residual))
}

/// Columns as an `len×count` matrix
fn stack(columns: &[Array1<Complex64>], len: usize) -> Array2<Complex64> {
    Array2::from_shape_fn((len, columns.len()), |(i, j)| columns[j][i])
}

/// Two passes of modified Gram-Schmidt against every vector in `basis`
fn reorthogonalize(basis: &[Array1<Complex64>], x: &mut Array1<Complex64>) {
    for _ in 0..2 {
        for q in basis {
            let c = inner(q.view(), x.view());
            Zip::from(&mut *x).and(q).for_each(|a, &b| *a -= c * b);
        }
    }
}

/// Scale `x` to unit length; short vectors get one more reorthogonalization
fn normalize_against(
    basis: &[Array1<Complex64>],
    x: Array1<Complex64>,
    length: f64,
    anorm: f64,
) -> Array1<Complex64> {
    let mut x = x.mapv(|z| z / length);
    if length < anorm * f64::EPSILON.sqrt() {
        reorthogonalize(basis, &mut x);
        let renorm = norm(x.view());
        x.mapv_inplace(|z| z / renorm);
    }
    x
}

fn start_vector(n: usize, seed: u64) -> Array1<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let v: Array1<Complex64> = (0..n)
        .map(|_| Complex64::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5))
        .collect();
    let length = norm(v.view());
    if length > 0.0 {
        v.mapv(|z| z / length)
    } else {
        let mut e = Array1::zeros(n);
        e[0] = Complex64::new(1.0, 0.0);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::orthogonality_error;

    fn low_rank(m: usize, n: usize, rank: usize) -> Array2<Complex64> {
        let mut a = Array2::zeros((m, n));
        for r in 0..rank {
            let weight = 10.0 / (r + 1) as f64;
            let x = Array1::from_shape_fn(m, |i| Complex64::from_polar(1.0, 0.3 * (r + 1) as f64 * i as f64));
            let y = Array1::from_shape_fn(n, |j| Complex64::from_polar(1.0, -0.7 * (r + 2) as f64 * j as f64));
            for i in 0..m {
                for j in 0..n {
                    a[[i, j]] += x[i] * y[j] * weight;
                }
            }
        }
        a
    }

    fn general(m: usize, n: usize) -> Array2<Complex64> {
        Array2::from_shape_fn((m, n), |(i, j)| {
            Complex64::new(((i * 7 + j * 3) % 11) as f64 - 5.0, ((i + j * j) % 5) as f64)
        })
    }

    fn check_against_dense(a: &Array2<Complex64>, rank: usize) {
        let top = truncated_svd(a, rank, 1e-14, 42).unwrap();
        let full = svd(&a.view()).unwrap();

        assert_eq!(top.u.dim(), (a.nrows(), rank));
        assert_eq!(top.v.dim(), (a.ncols(), rank));
        for i in 0..rank {
            let rel = (top.s[i] - full.s[i]).abs() / full.s[0];
            assert!(rel < 1e-9, "sigma {}: {} vs {}", i, top.s[i], full.s[i]);
        }
        assert!(orthogonality_error(&top.u.view()) < 1e-10);
        assert!(orthogonality_error(&top.v.view()) < 1e-10);
    }

    #[test]
    fn test_matches_dense_svd_square() {
        check_against_dense(&general(8, 8), 3);
    }

    #[test]
    fn test_matches_dense_svd_rectangular() {
        check_against_dense(&general(9, 5), 2);
        check_against_dense(&general(4, 10), 2);
    }

    #[test]
    fn test_low_rank_converges_early() {
        let a = low_rank(20, 16, 2);
        let top = truncated_svd(&a, 2, 1e-14, 1).unwrap();
        assert!(top.info.converged);
        assert!(top.info.iterations < 16, "{}", top.info);

        // A v_i = σ_i u_i
        for i in 0..2 {
            let av = a.dot(&top.v.column(i));
            for (x, y) in av.iter().zip(top.u.column(i).iter()) {
                assert!((x - y * top.s[i]).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_rank_one_breakdown_recovers() {
        let a = low_rank(6, 6, 1);
        let top = truncated_svd(&a, 3, 1e-14, 3).unwrap();
        assert!(top.s[0] > 1.0);
        assert!(top.s[1] < 1e-10 && top.s[2] < 1e-10);
        assert!(orthogonality_error(&top.u.view()) < 1e-10);
    }

    #[test]
    fn test_zero_operator() {
        let a = Array2::<Complex64>::zeros((5, 4));
        let top = truncated_svd(&a, 2, 1e-14, 0).unwrap();
        assert!(top.s.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let a = general(7, 6);
        let first = truncated_svd(&a, 2, 1e-14, 9).unwrap();
        let second = truncated_svd(&a, 2, 1e-14, 9).unwrap();
        assert_eq!(first.s, second.s);
        assert_eq!(first.u, second.u);
    }

    #[test]
    fn test_rejects_invalid_rank() {
        let a = general(3, 4);
        assert!(matches!(
            truncated_svd(&a, 0, 1e-14, 0),
            Err(KernelError::InvalidRank { .. })
        ));
        assert!(truncated_svd(&a, 4, 1e-14, 0).is_err());
    }

    #[test]
    fn test_solver_info_display() {
        let info = SolverInfo {
            iterations: 4,
            residual: 1e-13,
            converged: true,
        };
        assert!(info.to_string().contains("converged in 4 iterations"));
    }
}
