//! Dimension and parity planning for the multi-level Hankel lifting
//!
//! A tensor `x` of shape `(n1, n2, n3)` is lifted into the matrix
//!
//! ```text
//! H(x)[a, b] = x[a + b],   a ∈ [0,p1)×[0,p2)×[0,p3),  b ∈ [0,q1)×[0,q2)×[0,q3)
//! ```
//!
//! where, per axis, `p = (n+1)/2` for odd `n`, `p = n/2` for even `n`, and
//! `q = n + 1 - p`. The matrix has `l1 = p1·p2·p3` rows and `l2 = q1·q2·q3`
//! columns and is never materialized by the solver.
//!
//! Two global cases drive all downstream branching:
//!
//! - [`LiftCase::Symmetric`]: every axis is odd, `p = q`, and `H(x)` is
//!   complex symmetric (`Hᵀ = H`), so a single basis `U` describes it.
//! - [`LiftCase::General`]: at least one axis is even and `H(x)` is
//!   rectangular, so paired bases `U`, `V` are required.
//!
//! # Multiplicity
//!
//! Folding the lifted matrix back onto the tensor sums every anti-diagonal
//! entry. Coordinate `k` along one axis receives
//! `min(k+1, p, q, n-k)` contributions, i.e. the tent `1,2,…,p,…,2,1` (odd) or
//! `1,2,…,p,p,…,2,1` (even). The 3-D multiplicity tensor is the outer product
//! of the three tents and is strictly positive everywhere.

use crate::error::{CoreError, CoreResult};
use scirs2_core::ndarray_ext::Array3;

/// Lifting geometry of a single axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPlan {
    /// Axis length
    pub n: usize,
    /// Row-block extent
    pub p: usize,
    /// Column-block extent (`n + 1 - p`)
    pub q: usize,
}

impl AxisPlan {
    /// Plan one axis of length `n`
    pub fn new(n: usize) -> CoreResult<Self> {
        if n == 0 {
            return Err(CoreError::InvalidShape(
                "axis length must be positive".to_string(),
            ));
        }
        let p = if n % 2 == 1 { (n + 1) / 2 } else { n / 2 };
        Ok(Self { n, p, q: n + 1 - p })
    }

    /// Whether the axis length is odd
    pub fn is_odd(&self) -> bool {
        self.n % 2 == 1
    }

    /// Per-axis multiplicity sequence of length `n`
    ///
    /// # Examples
    ///
    /// ```
    /// use specrso_core::AxisPlan;
    ///
    /// assert_eq!(AxisPlan::new(5).unwrap().tent(), vec![1.0, 2.0, 3.0, 2.0, 1.0]);
    /// assert_eq!(AxisPlan::new(4).unwrap().tent(), vec![1.0, 2.0, 2.0, 1.0]);
    /// ```
    pub fn tent(&self) -> Vec<f64> {
        (0..self.n)
            .map(|k| (k + 1).min(self.p).min(self.q).min(self.n - k) as f64)
            .collect()
    }
}

/// Symmetry class of the lifted matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiftCase {
    /// All axes odd: square, complex-symmetric lifting (one basis)
    Symmetric,
    /// At least one even axis: rectangular lifting (paired bases)
    General,
}

/// Complete lifting plan for a 3-D tensor shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HankelPlan {
    axes: [AxisPlan; 3],
    case: LiftCase,
}

impl HankelPlan {
    /// Build the plan for a tensor of shape `dims`
    ///
    /// # Examples
    ///
    /// ```
    /// use specrso_core::{HankelPlan, LiftCase};
    ///
    /// let plan = HankelPlan::new([5, 5, 5]).unwrap();
    /// assert_eq!(plan.case(), LiftCase::Symmetric);
    /// assert_eq!((plan.nrows(), plan.ncols()), (27, 27));
    ///
    /// let plan = HankelPlan::new([4, 5, 6]).unwrap();
    /// assert_eq!(plan.case(), LiftCase::General);
    /// assert_eq!(plan.row_shape(), [2, 3, 3]);
    /// assert_eq!(plan.col_shape(), [3, 3, 4]);
    /// ```
    pub fn new(dims: [usize; 3]) -> CoreResult<Self> {
        let axes = [
            AxisPlan::new(dims[0])?,
            AxisPlan::new(dims[1])?,
            AxisPlan::new(dims[2])?,
        ];
        let case = if axes.iter().all(AxisPlan::is_odd) {
            LiftCase::Symmetric
        } else {
            LiftCase::General
        };
        Ok(Self { axes, case })
    }

    /// Per-axis plans
    pub fn axes(&self) -> &[AxisPlan; 3] {
        &self.axes
    }

    /// Symmetry class
    pub fn case(&self) -> LiftCase {
        self.case
    }

    /// Tensor shape `(n1, n2, n3)`
    pub fn dims(&self) -> [usize; 3] {
        [self.axes[0].n, self.axes[1].n, self.axes[2].n]
    }

    /// Row-block shape `(p1, p2, p3)`
    pub fn row_shape(&self) -> [usize; 3] {
        [self.axes[0].p, self.axes[1].p, self.axes[2].p]
    }

    /// Column-block shape `(q1, q2, q3)`
    pub fn col_shape(&self) -> [usize; 3] {
        [self.axes[0].q, self.axes[1].q, self.axes[2].q]
    }

    /// Number of rows `l1` of the lifted matrix
    pub fn nrows(&self) -> usize {
        self.row_shape().iter().product()
    }

    /// Number of columns `l2` of the lifted matrix
    pub fn ncols(&self) -> usize {
        self.col_shape().iter().product()
    }

    /// Number of tensor entries `N = n1·n2·n3`
    pub fn len(&self) -> usize {
        self.dims().iter().product()
    }

    /// Always false: planned shapes have positive axes
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Multiplicity tensor `DD` (outer product of the per-axis tents)
    pub fn multiplicity(&self) -> Array3<f64> {
        let [t1, t2, t3] = [self.axes[0].tent(), self.axes[1].tent(), self.axes[2].tent()];
        Array3::from_shape_fn(
            (self.axes[0].n, self.axes[1].n, self.axes[2].n),
            |(i, j, k)| t1[i] * t2[j] * t3[k],
        )
    }
}

/// Row-major linear index of `(i1, i2, i3)` in a tensor of shape `dims`
#[inline]
pub fn linear_index(dims: [usize; 3], i1: usize, i2: usize, i3: usize) -> usize {
    (i1 * dims[1] + i2) * dims[2] + i3
}
