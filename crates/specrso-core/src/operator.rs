//! Matrix-free multi-level Hankel operator
//!
//! [`HankelOperator`] snapshots the Fourier spectrum of a tensor estimate and
//! answers products with the lifted matrix `H(x)` without forming it:
//!
//! ```text
//! (H z)[a]  = Σ_b x[a+b] z[b]          a in the row block, b in the column block
//! (Hᵀ z)[b] = Σ_a x[a+b] z[a]
//! (H* z)    = conj(Hᵀ conj(z))
//! ```
//!
//! Each product is a cross-correlation of `x` with the zero-embedded input.
//! It is evaluated on the `n1×n2×n3` grid as
//! `ifftn(X ⊙ conj(fftn(conj(w))))`; since `a + b ≤ n - 1` along every axis
//! the circular correlation agrees with the linear one on the gathered block.
//!
//! An operator is tied to one tensor snapshot. The solver rebuilds it every
//! iteration because the estimate changes.

use crate::error::{CoreError, CoreResult};
use crate::fft::{fftn3, ifftn3};
use crate::index_map::{IndexMap, IndexMaps};
use crate::plan::HankelPlan;
use scirs2_core::ndarray_ext::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis, Zip};
use scirs2_core::numeric::Complex64;

/// A linear map available only through products with itself and its adjoint
pub trait LinearOperator {
    /// Output dimension of [`apply`](Self::apply)
    fn nrows(&self) -> usize;

    /// Input dimension of [`apply`](Self::apply)
    fn ncols(&self) -> usize;

    /// `y = A x`
    fn apply(&self, x: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>>;

    /// `y = A* x`
    fn apply_adjoint(&self, x: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>>;
}

impl LinearOperator for Array2<Complex64> {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn apply(&self, x: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>> {
        if x.len() != self.ncols() {
            return Err(CoreError::length_mismatch("apply", self.ncols(), x.len()));
        }
        Ok(self.dot(&x))
    }

    fn apply_adjoint(&self, x: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>> {
        if x.len() != self.nrows() {
            return Err(CoreError::length_mismatch(
                "apply_adjoint",
                self.nrows(),
                x.len(),
            ));
        }
        Ok(self.t().mapv(|z| z.conj()).dot(&x))
    }
}

/// Lifted-matrix operator for one tensor snapshot
#[derive(Debug, Clone)]
pub struct HankelOperator<'a> {
    plan: &'a HankelPlan,
    maps: &'a IndexMaps,
    spectrum: Array3<Complex64>,
}

impl<'a> HankelOperator<'a> {
    /// Snapshot `x` for products with `H(x)`
    pub fn new(plan: &'a HankelPlan, maps: &'a IndexMaps, x: &Array3<Complex64>) -> CoreResult<Self> {
        let (n1, n2, n3) = x.dim();
        if [n1, n2, n3] != plan.dims() {
            return Err(CoreError::InvalidShape(format!(
                "tensor {:?} does not match plan {:?}",
                [n1, n2, n3],
                plan.dims()
            )));
        }

        Ok(Self {
            plan,
            maps,
            spectrum: fftn3(x)?,
        })
    }

    /// Lifting plan this operator was built for
    pub fn plan(&self) -> &HankelPlan {
        self.plan
    }

    /// Materialize `H(x)` for the snapshot tensor
    ///
    /// Diagnostic only; the result has `l1·l2` entries.
    pub fn to_dense(&self) -> CoreResult<Array2<Complex64>> {
        dense_hankel(self.plan, &ifftn3(&self.spectrum)?)
    }

    /// `H z` for `z` indexed by the column block
    pub fn apply_forward(&self, z: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>> {
        self.correlate(z, self.maps.cols(), self.maps.rows())
    }

    /// `Hᵀ z` for `z` indexed by the row block
    pub fn apply_transpose(&self, z: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>> {
        self.correlate(z, self.maps.rows(), self.maps.cols())
    }

    /// `H* z` for `z` indexed by the row block
    pub fn apply_conjugate_transpose(
        &self,
        z: ArrayView1<'_, Complex64>,
    ) -> CoreResult<Array1<Complex64>> {
        let conj = z.mapv(|v| v.conj());
        Ok(self.apply_transpose(conj.view())?.mapv(|v| v.conj()))
    }

    /// Column-wise `H Z`
    pub fn apply_forward_matrix(&self, z: ArrayView2<'_, Complex64>) -> CoreResult<Array2<Complex64>> {
        self.apply_columns(z, self.plan.nrows(), |col| self.apply_forward(col))
    }

    /// Column-wise `H* Z`
    pub fn apply_adjoint_matrix(&self, z: ArrayView2<'_, Complex64>) -> CoreResult<Array2<Complex64>> {
        self.apply_columns(z, self.plan.ncols(), |col| {
            self.apply_conjugate_transpose(col)
        })
    }

    fn apply_columns<F>(
        &self,
        z: ArrayView2<'_, Complex64>,
        out_rows: usize,
        apply: F,
    ) -> CoreResult<Array2<Complex64>>
    where
        F: Fn(ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>>,
    {
        let mut out = Array2::zeros((out_rows, z.ncols()));
        for (col, mut target) in z.axis_iter(Axis(1)).zip(out.axis_iter_mut(Axis(1))) {
            target.assign(&apply(col)?);
        }
        Ok(out)
    }

    fn correlate(
        &self,
        z: ArrayView1<'_, Complex64>,
        input: &IndexMap,
        output: &IndexMap,
    ) -> CoreResult<Array1<Complex64>> {
        let embedded = input.scatter(z, true)?;
        let mut product = fftn3(&embedded)?;
        Zip::from(&mut product)
            .and(&self.spectrum)
            .for_each(|w, &x| *w = x * w.conj());

        output.gather(&ifftn3(&product)?)
    }
}

impl LinearOperator for HankelOperator<'_> {
    fn nrows(&self) -> usize {
        self.plan.nrows()
    }

    fn ncols(&self) -> usize {
        self.plan.ncols()
    }

    fn apply(&self, x: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>> {
        self.apply_forward(x)
    }

    fn apply_adjoint(&self, x: ArrayView1<'_, Complex64>) -> CoreResult<Array1<Complex64>> {
        self.apply_conjugate_transpose(x)
    }
}

/// Materialize `H(x)` entry by entry
///
/// Quadratic in the tensor size; intended for diagnostics and for checking
/// the matrix-free products on small shapes.
pub fn dense_hankel(plan: &HankelPlan, x: &Array3<Complex64>) -> CoreResult<Array2<Complex64>> {
    let (n1, n2, n3) = x.dim();
    if [n1, n2, n3] != plan.dims() {
        return Err(CoreError::InvalidShape(format!(
            "tensor {:?} does not match plan {:?}",
            [n1, n2, n3],
            plan.dims()
        )));
    }

    let [p1, p2, p3] = plan.row_shape();
    let [q1, q2, q3] = plan.col_shape();
    let mut h = Array2::zeros((plan.nrows(), plan.ncols()));

    let mut row = 0;
    for a1 in 0..p1 {
        for a2 in 0..p2 {
            for a3 in 0..p3 {
                let mut col = 0;
                for b1 in 0..q1 {
                    for b2 in 0..q2 {
                        for b3 in 0..q3 {
                            h[[row, col]] = x[[a1 + b1, a2 + b2, a3 + b3]];
                            col += 1;
                        }
                    }
                }
                row += 1;
            }
        }
    }

    Ok(h)
}
