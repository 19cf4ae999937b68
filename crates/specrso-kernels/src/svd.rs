//! Thin complex SVD by one-sided (Hestenes) Jacobi rotations
//!
//! The columns of a working copy `W = A V` are rotated pairwise until they are
//! mutually orthogonal; then `σ_j = ‖w_j‖`, `u_j = w_j / σ_j` and
//! `A = U Σ Vᴴ`. Accurate for the small (at most `2r×2r`) coupling matrices
//! of the subspace update, and fully deterministic.

use crate::dense::{all_finite, completion_vector, conj_transpose, inner, norm};
use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayView2};
use scirs2_core::numeric::Complex64;

/// Upper bound on full sweeps over all column pairs
const MAX_SWEEPS: usize = 64;

/// Thin SVD factors `A = U diag(s) Vᴴ`
#[derive(Debug, Clone)]
pub struct SvdDecomp {
    /// Left singular vectors, one per column
    pub u: Array2<Complex64>,
    /// Singular values, non-negative and sorted descending
    pub s: Array1<f64>,
    /// Right singular vectors, one per column
    pub v: Array2<Complex64>,
}

impl SvdDecomp {
    /// Number of singular triplets held
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// Whether no triplets are held
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Keep the leading `rank` triplets
    pub fn truncate(&self, rank: usize) -> SvdDecomp {
        let k = rank.min(self.len());
        SvdDecomp {
            u: self.u.slice(s![.., ..k]).to_owned(),
            s: self.s.slice(s![..k]).to_owned(),
            v: self.v.slice(s![.., ..k]).to_owned(),
        }
    }

    /// `U diag(s) Vᴴ`
    pub fn reconstruct(&self) -> Array2<Complex64> {
        let mut us = self.u.clone();
        for (mut col, &sigma) in us.columns_mut().into_iter().zip(self.s.iter()) {
            col.mapv_inplace(|z| z * sigma);
        }
        us.dot(&conj_transpose(&self.v.view()))
    }
}

/// Thin SVD of an `m×n` complex matrix
///
/// Returns `k = min(m, n)` triplets. Singular values are sorted descending
/// with ties kept in column order, and the left vectors belonging to
/// numerically zero singular values are completed so `U` stays orthonormal.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array2;
/// use scirs2_core::numeric::Complex64;
/// use specrso_kernels::svd;
///
/// let mut a = Array2::<Complex64>::zeros((3, 2));
/// a[[0, 0]] = Complex64::new(0.0, 3.0);
/// a[[2, 1]] = Complex64::new(4.0, 0.0);
/// let svd = svd(&a.view()).unwrap();
/// assert!((svd.s[0] - 4.0).abs() < 1e-12);
/// assert!((svd.s[1] - 3.0).abs() < 1e-12);
/// ```
pub fn svd(a: &ArrayView2<'_, Complex64>) -> KernelResult<SvdDecomp> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err(KernelError::dimension_mismatch(
            "svd",
            format!("empty {}x{} matrix", m, n),
        ));
    }
    if !all_finite(a.iter()) {
        return Err(KernelError::NonFinite { operation: "svd" });
    }

    if m < n {
        // A = (Aᴴ)ᴴ = (U' Σ V'ᴴ)ᴴ = V' Σ U'ᴴ
        let tall = jacobi_tall(conj_transpose(a))?;
        return Ok(SvdDecomp {
            u: tall.v,
            s: tall.s,
            v: tall.u,
        });
    }
    jacobi_tall(a.to_owned())
}

fn jacobi_tall(mut w: Array2<Complex64>) -> KernelResult<SvdDecomp> {
    let (m, n) = w.dim();
    let mut v = Array2::<Complex64>::eye(n);

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n.saturating_sub(1) {
            for q in p + 1..n {
                if rotate_pair(&mut w, &mut v, p, q) {
                    rotated = true;
                }
            }
        }
        if !rotated {
            break;
        }
    }

    let sigma: Vec<f64> = (0..n).map(|j| norm(w.column(j))).collect();
    let mut order: Vec<usize> = (0..n).collect();
    // Stable sort keeps ties in column order
    order.sort_by(|&i, &j| sigma[j].total_cmp(&sigma[i]));

    let sigma_max = order.first().map_or(0.0, |&i| sigma[i]);
    let negligible = sigma_max * m as f64 * f64::EPSILON;

    let mut u = Array2::<Complex64>::zeros((m, n));
    let mut s_out = Array1::<f64>::zeros(n);
    let mut v_out = Array2::<Complex64>::zeros((n, n));

    for (dst, &src) in order.iter().enumerate() {
        let value = sigma[src];
        v_out.column_mut(dst).assign(&v.column(src));

        if value > negligible && value > 0.0 {
            s_out[dst] = value;
            u.column_mut(dst).assign(&w.column(src).mapv(|z| z / value));
        } else {
            let filled = u.slice(s![.., ..dst]).to_owned();
            u.column_mut(dst).assign(&completion_vector(&filled.view())?);
        }
    }

    Ok(SvdDecomp {
        u,
        s: s_out,
        v: v_out,
    })
}

/// Orthogonalize columns `p` and `q` of `w`; returns whether a rotation was applied
fn rotate_pair(w: &mut Array2<Complex64>, v: &mut Array2<Complex64>, p: usize, q: usize) -> bool {
    let alpha = w.column(p).iter().map(|z| z.norm_sqr()).sum::<f64>();
    let beta = w.column(q).iter().map(|z| z.norm_sqr()).sum::<f64>();
    let gamma = inner(w.column(p), w.column(q));
    let magnitude = gamma.norm();

    if alpha == 0.0 || beta == 0.0 || magnitude <= f64::EPSILON * (alpha * beta).sqrt() {
        return false;
    }

    let phase = gamma / magnitude;
    let zeta = (beta - alpha) / (2.0 * magnitude);
    let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
    let c = 1.0 / (1.0 + t * t).sqrt();
    let sn = c * t;

    apply_rotation(w, p, q, c, sn, phase);
    apply_rotation(v, p, q, c, sn, phase);
    true
}

/// Columns `(x_p, x_q) ← (c x_p − s e^{-iφ} x_q, s e^{iφ} x_p + c x_q)`
fn apply_rotation(x: &mut Array2<Complex64>, p: usize, q: usize, c: f64, sn: f64, phase: Complex64) {
    let forward = phase * sn;
    let backward = phase.conj() * sn;
    for mut row in x.rows_mut() {
        let xp = row[p];
        let xq = row[q];
        row[p] = xp * c - backward * xq;
        row[q] = forward * xp + xq * c;
    }
}
