//! Low-rank strategy for shapes with an even axis (rectangular lifting)
//!
//! `H ≈ U Σ Vᴴ` with `U` spanning row-block vectors and `V` column-block
//! vectors. One update explores both sides of the tangent space:
//!
//! ```text
//! C  = Uᴴ H V
//! X1 = H V  - U C   = Q1 R1      (QR against U)
//! X2 = Hᴴ U - V Cᴴ  = Q2 R2      (QR against V)
//! M  = [[C, R2ᴴ], [R1, 0]] = P Σ Wᴴ
//! U ← [U, Q1] P[:, ..r],  V ← [V, Q2] W[:, ..r]
//! ```

use crate::config::ReconConfig;
use crate::error::{ReconError, ReconResult};
use crate::rank::adapt_rank;
use crate::strategy::{coupling_block, Factors, Lifting, LowRankStrategy};
use scirs2_core::ndarray_ext::{s, Array2, Array3};
use scirs2_core::numeric::Complex64;
use specrso_core::LiftCase;
use specrso_kernels::{conj, conj_transpose, hstack, qr_against, svd, truncated_svd, QrDecomp};

/// Paired-basis strategy for [`LiftCase::General`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralStrategy;

impl GeneralStrategy {
    fn right_basis<'f>(&self, factors: &'f Factors) -> ReconResult<&'f Array2<Complex64>> {
        factors.v.as_ref().ok_or_else(|| {
            ReconError::invalid("general lifting requires a right basis")
        })
    }
}

impl LowRankStrategy for GeneralStrategy {
    fn case(&self) -> LiftCase {
        LiftCase::General
    }

    fn initial_factorization(
        &self,
        lifting: &Lifting,
        x: &Array3<Complex64>,
        config: &ReconConfig,
    ) -> ReconResult<Factors> {
        let op = lifting.operator(x)?;
        let top = truncated_svd(&op, config.rank, config.svd_tol, config.seed)?;
        tracing::debug!(info = %top.info, "general bootstrap factorization");

        Ok(Factors {
            u: top.u,
            v: Some(top.v),
            s: top.s,
        })
    }

    fn update_subspace(
        &self,
        lifting: &Lifting,
        x: &Array3<Complex64>,
        factors: &Factors,
    ) -> ReconResult<Factors> {
        let op = lifting.operator(x)?;
        let u = &factors.u;
        let v = self.right_basis(factors)?;

        let hv = op.apply_forward_matrix(v.view())?;
        let hu = op.apply_adjoint_matrix(u.view())?;
        let c = conj_transpose(&u.view()).dot(&hv);

        let left_residual = &hv - &u.dot(&c);
        let right_residual = &hu - &v.dot(&conj_transpose(&c.view()));
        let QrDecomp { q: q1, r: r1 } = qr_against(Some(&u.view()), &left_residual.view())?;
        let QrDecomp { q: q2, r: r2 } = qr_against(Some(&v.view()), &right_residual.view())?;

        let m = coupling_block(&c, &conj_transpose(&r2.view()), &r1);
        let small = svd(&m.view())?;
        let rank = adapt_rank(&small.s.to_vec(), factors.rank(), lifting.epsilon());

        let left = hstack(&u.view(), &q1.view())?;
        let right = hstack(&v.view(), &q2.view())?;
        Ok(Factors {
            u: left.dot(&small.u.slice(s![.., ..rank])),
            v: Some(right.dot(&small.v.slice(s![.., ..rank]))),
            s: small.s.slice(s![..rank]).to_owned(),
        })
    }

    fn reconstruct(&self, lifting: &Lifting, factors: &Factors) -> ReconResult<Array3<Complex64>> {
        let v = self.right_basis(factors)?;
        lifting.fold(&factors.s, &factors.u, &conj(&v.view()))
    }
}
