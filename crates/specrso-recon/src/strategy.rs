//! Low-rank strategies for the two lifting cases
//!
//! The reconstruction loop is written once against [`LowRankStrategy`]; the
//! case-specific linear algebra lives in two implementations selected from
//! the parity of the tensor shape:
//!
//! - [`SymmetricStrategy`](crate::SymmetricStrategy): all axes odd, the
//!   lifting is complex symmetric and `H ≈ U Σ Uᵀ` (Takagi form)
//! - [`GeneralStrategy`](crate::GeneralStrategy): at least one even axis,
//!   `H ≈ U Σ Vᴴ` with paired bases
//!
//! [`Lifting`] carries everything that depends only on the tensor shape and
//! is shared across iterations.

use crate::config::ReconConfig;
use crate::error::ReconResult;
use crate::general::GeneralStrategy;
use crate::rank::rank_threshold;
use crate::symmetric::SymmetricStrategy;
use scirs2_core::ndarray_ext::{Array1, Array2, Array3, Zip};
use scirs2_core::numeric::Complex64;
use specrso_core::{Convolver, FftConvolver, HankelOperator, HankelPlan, IndexMaps, LiftCase};

/// Shape-dependent state of a reconstruction
#[derive(Debug)]
pub struct Lifting {
    plan: HankelPlan,
    maps: IndexMaps,
    multiplicity: Array3<f64>,
    epsilon: f64,
    convolver: Box<dyn Convolver>,
}

impl Lifting {
    /// Plan, index tables and multiplicity for a `dims` tensor
    pub fn new(dims: [usize; 3]) -> ReconResult<Self> {
        let plan = HankelPlan::new(dims)?;
        let maps = IndexMaps::new(&plan)?;
        let multiplicity = plan.multiplicity();
        let epsilon = rank_threshold(plan.nrows(), plan.ncols());
        Ok(Self {
            plan,
            maps,
            multiplicity,
            epsilon,
            convolver: Box::new(FftConvolver),
        })
    }

    /// Replace the convolution backend used to fold factors
    pub fn with_convolver(mut self, convolver: Box<dyn Convolver>) -> Self {
        self.convolver = convolver;
        self
    }

    /// Lifting plan
    pub fn plan(&self) -> &HankelPlan {
        &self.plan
    }

    /// Gather/scatter tables
    pub fn maps(&self) -> &IndexMaps {
        &self.maps
    }

    /// Multiplicity tensor `DD`
    pub fn multiplicity(&self) -> &Array3<f64> {
        &self.multiplicity
    }

    /// Rank truncation threshold `ε`
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Matrix-free `H(x)` for one estimate
    pub fn operator<'a>(&'a self, x: &Array3<Complex64>) -> ReconResult<HankelOperator<'a>> {
        Ok(HankelOperator::new(&self.plan, &self.maps, x)?)
    }

    /// Fold `Σ s_i left_i right_iᵀ` back onto the tensor grid
    ///
    /// Column `i` of `left` is a row-block vector and column `i` of `right` a
    /// column-block vector; each term becomes the full 3-D convolution of the
    /// two block tensors, and the sum is divided by `DD`.
    pub fn fold(
        &self,
        s: &Array1<f64>,
        left: &Array2<Complex64>,
        right: &Array2<Complex64>,
    ) -> ReconResult<Array3<Complex64>> {
        let [n1, n2, n3] = self.plan.dims();
        let mut x = Array3::<Complex64>::zeros((n1, n2, n3));

        for (i, &sigma) in s.iter().enumerate() {
            let a = self.maps.rows().block_tensor(left.column(i))?;
            let b = self.maps.cols().block_tensor(right.column(i))?;
            let term = self.convolver.convolve(&a, &b)?;
            Zip::from(&mut x)
                .and(&term)
                .for_each(|acc, &t| *acc += t * sigma);
        }

        Zip::from(&mut x)
            .and(&self.multiplicity)
            .for_each(|z, &d| *z /= d);
        Ok(x)
    }
}

/// Working low-rank factorization of the lifted estimate
///
/// `v` is `None` for the symmetric case, where the right factor is `conj(u)`.
#[derive(Debug, Clone)]
pub struct Factors {
    /// `l1×r` orthonormal left basis
    pub u: Array2<Complex64>,
    /// `l2×r` orthonormal right basis
    pub v: Option<Array2<Complex64>>,
    /// `r` singular values, sorted descending
    pub s: Array1<f64>,
}

impl Factors {
    /// Working rank `r`
    pub fn rank(&self) -> usize {
        self.s.len()
    }
}

/// Case-specific bootstrap, subspace update and reconstruction
pub trait LowRankStrategy: std::fmt::Debug {
    /// Lifting case handled by this strategy
    fn case(&self) -> LiftCase;

    /// Rank-`config.rank` factorization of `H(x)` for the zero-filled estimate
    fn initial_factorization(
        &self,
        lifting: &Lifting,
        x: &Array3<Complex64>,
        config: &ReconConfig,
    ) -> ReconResult<Factors>;

    /// One tangent-space update of `factors` against `H(x)`, with rank adaptation
    ///
    /// The returned rank may be 0; the caller treats that as a collapse.
    fn update_subspace(
        &self,
        lifting: &Lifting,
        x: &Array3<Complex64>,
        factors: &Factors,
    ) -> ReconResult<Factors>;

    /// Tensor whose lifting is the factorization, `fold(U Σ Vᴴ) / DD`
    fn reconstruct(&self, lifting: &Lifting, factors: &Factors) -> ReconResult<Array3<Complex64>>;
}

/// Strategy for the lifting case of `plan`
pub fn strategy_for(plan: &HankelPlan) -> Box<dyn LowRankStrategy> {
    match plan.case() {
        LiftCase::Symmetric => Box::new(SymmetricStrategy),
        LiftCase::General => Box::new(GeneralStrategy),
    }
}

/// `[[top_left, top_right], [bottom_left, 0]]` for square `r×r` blocks
pub(crate) fn coupling_block(
    top_left: &Array2<Complex64>,
    top_right: &Array2<Complex64>,
    bottom_left: &Array2<Complex64>,
) -> Array2<Complex64> {
    let r = top_left.nrows();
    let mut m = Array2::<Complex64>::zeros((2 * r, 2 * r));
    for i in 0..r {
        for j in 0..r {
            m[[i, j]] = top_left[[i, j]];
            m[[i, j + r]] = top_right[[i, j]];
            m[[i + r, j]] = bottom_left[[i, j]];
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use specrso_core::DirectConvolver;

    #[test]
    fn test_lifting_threshold_and_multiplicity() {
        let lifting = Lifting::new([3, 4, 5]).unwrap();
        let plan = lifting.plan();
        assert_eq!(
            lifting.epsilon(),
            f64::EPSILON * (plan.nrows() * plan.ncols()) as f64
        );
        assert!(lifting.multiplicity().iter().all(|&d| d >= 1.0));
        assert!(Lifting::new([3, 0, 5]).is_err());
    }

    #[test]
    fn test_strategy_selection() {
        let odd = HankelPlan::new([3, 5, 7]).unwrap();
        let mixed = HankelPlan::new([3, 4, 7]).unwrap();
        assert_eq!(strategy_for(&odd).case(), LiftCase::Symmetric);
        assert_eq!(strategy_for(&mixed).case(), LiftCase::General);
    }

    #[test]
    fn test_fold_of_rank_one_lifting_recovers_tensor() {
        // x = a ⊗ b ⊗ c with geometric axes has a rank-one lifting u vᵀ
        let dims = [4, 3, 5];
        let ratio = [
            Complex64::from_polar(1.0, 0.4),
            Complex64::from_polar(0.9, -1.1),
            Complex64::from_polar(1.0, 2.0),
        ];
        let geometric = |axis: usize, k: usize| ratio[axis].powu(k as u32);

        let lifting = Lifting::new(dims).unwrap();
        let plan = lifting.plan();
        let [_, p2, p3] = plan.row_shape();
        let [_, q2, q3] = plan.col_shape();

        let u = Array2::from_shape_fn((plan.nrows(), 1), |(i, _)| {
            let (a1, a2, a3) = (i / (p2 * p3), (i / p3) % p2, i % p3);
            geometric(0, a1) * geometric(1, a2) * geometric(2, a3)
        });
        let v = Array2::from_shape_fn((plan.ncols(), 1), |(j, _)| {
            let (b1, b2, b3) = (j / (q2 * q3), (j / q3) % q2, j % q3);
            geometric(0, b1) * geometric(1, b2) * geometric(2, b3)
        });
        let s = Array1::from(vec![1.0]);

        let x = lifting.fold(&s, &u, &v).unwrap();
        let direct = Lifting::new(dims)
            .unwrap()
            .with_convolver(Box::new(DirectConvolver))
            .fold(&s, &u, &v)
            .unwrap();

        for ((i, j, k), value) in x.indexed_iter() {
            let expected = geometric(0, i) * geometric(1, j) * geometric(2, k);
            assert!((value - expected).norm() < 1e-12);
            assert!((value - direct[[i, j, k]]).norm() < 1e-12);
        }
    }

    #[test]
    fn test_coupling_block_layout() {
        let one = Array2::from_elem((2, 2), Complex64::new(1.0, 0.0));
        let two = Array2::from_elem((2, 2), Complex64::new(2.0, 0.0));
        let three = Array2::from_elem((2, 2), Complex64::new(3.0, 0.0));
        let m = coupling_block(&one, &two, &three);
        assert_eq!(m[[0, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(m[[1, 3]], Complex64::new(2.0, 0.0));
        assert_eq!(m[[3, 0]], Complex64::new(3.0, 0.0));
        assert_eq!(m[[3, 3]], Complex64::new(0.0, 0.0));
    }
}
