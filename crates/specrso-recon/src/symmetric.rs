//! Low-rank strategy for all-odd shapes (complex-symmetric lifting)
//!
//! With `p = q` on every axis the lifting satisfies `Hᵀ = H`, so a rank-`r`
//! approximation takes the Takagi form `H ≈ U Σ Uᵀ` and one orthonormal basis
//! suffices. Then `H conj(U) = U Σ`, which drives the tangent-space update:
//!
//! ```text
//! C = Uᴴ H conj(U)                 r×r, complex symmetric
//! X = H conj(U) - U C = Q R        (QR against U)
//! M = [[C, Rᵀ], [R, 0]] = P Σ Wᴴ
//! U ← [U, Q] T[:, ..r]             T = Takagi vectors of M
//! ```
//!
//! Takagi vectors of `M` come from its SVD through
//! [`takagi_vectors`](specrso_kernels::takagi_vectors), which factors each
//! cluster of repeated singular values as a block, so equal-energy modes are
//! recovered as exactly as distinct ones.

use crate::config::ReconConfig;
use crate::error::ReconResult;
use crate::rank::adapt_rank;
use crate::strategy::{coupling_block, Factors, Lifting, LowRankStrategy};
use scirs2_core::ndarray_ext::{s, Array3};
use scirs2_core::numeric::Complex64;
use specrso_core::LiftCase;
use specrso_kernels::{
    conj, conj_transpose, hstack, qr_against, svd, takagi_vectors, truncated_svd, QrDecomp,
};

/// Takagi-form strategy for [`LiftCase::Symmetric`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricStrategy;

impl LowRankStrategy for SymmetricStrategy {
    fn case(&self) -> LiftCase {
        LiftCase::Symmetric
    }

    fn initial_factorization(
        &self,
        lifting: &Lifting,
        x: &Array3<Complex64>,
        config: &ReconConfig,
    ) -> ReconResult<Factors> {
        let op = lifting.operator(x)?;
        let top = truncated_svd(&op, config.rank, config.svd_tol, config.seed)?;
        tracing::debug!(info = %top.info, "symmetric bootstrap factorization");

        let u = takagi_vectors(&top.u.view(), &top.v.view(), &top.s.view(), config.rank)?;
        Ok(Factors {
            u,
            v: None,
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

        let hu = op.apply_forward_matrix(conj(&u.view()).view())?;
        let c = conj_transpose(&u.view()).dot(&hu);
        let residual = &hu - &u.dot(&c);
        let QrDecomp { q, r } = qr_against(Some(&u.view()), &residual.view())?;

        let m = coupling_block(&c, &r.t().to_owned(), &r);
        let small = svd(&m.view())?;
        let rank = adapt_rank(&small.s.to_vec(), factors.rank(), lifting.epsilon());

        let rotation = takagi_vectors(&small.u.view(), &small.v.view(), &small.s.view(), rank)?;
        let basis = hstack(&u.view(), &q.view())?;
        Ok(Factors {
            u: basis.dot(&rotation),
            v: None,
            s: small.s.slice(s![..rank]).to_owned(),
        })
    }

    fn reconstruct(&self, lifting: &Lifting, factors: &Factors) -> ReconResult<Array3<Complex64>> {
        lifting.fold(&factors.s, &factors.u, &factors.u)
    }
}
