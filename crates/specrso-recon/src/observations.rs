//! Observed samples of a tensor
//!
//! Samples are addressed by row-major linear index into the `n1×n2×n3` grid
//! (see [`specrso_core::linear_index`]).

use crate::error::{ReconError, ReconResult};
use scirs2_core::ndarray_ext::{Array1, Array3};
use scirs2_core::numeric::Complex64;
use std::collections::HashSet;

/// Validated set of unique sample positions paired with their values
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    dims: [usize; 3],
    indices: Vec<usize>,
    values: Array1<Complex64>,
}

impl Observations {
    /// Pair `values[j]` with linear index `indices[j]` of a `dims` tensor
    ///
    /// Rejects length mismatches, an empty sample set, out-of-range or
    /// repeated indices and non-finite values.
    ///
    /// # Examples
    ///
    /// ```
    /// use scirs2_core::numeric::Complex64;
    /// use specrso_recon::Observations;
    ///
    /// let one = Complex64::new(1.0, 0.0);
    /// let obs = Observations::new([2, 2, 2], vec![0, 7], vec![one, one]).unwrap();
    /// assert_eq!(obs.len(), 2);
    /// assert!(Observations::new([2, 2, 2], vec![0, 8], vec![one, one]).is_err());
    /// ```
    pub fn new(
        dims: [usize; 3],
        indices: Vec<usize>,
        values: impl Into<Array1<Complex64>>,
    ) -> ReconResult<Self> {
        let values = values.into();
        if indices.len() != values.len() {
            return Err(ReconError::invalid(format!(
                "{} indices but {} values",
                indices.len(),
                values.len()
            )));
        }
        if indices.is_empty() {
            return Err(ReconError::invalid("no observed samples"));
        }
        if dims.contains(&0) {
            return Err(ReconError::invalid(format!(
                "tensor shape {:?} has an empty axis",
                dims
            )));
        }

        let total: usize = dims.iter().product();
        let mut seen = HashSet::with_capacity(indices.len());
        for &index in &indices {
            if index >= total {
                return Err(ReconError::invalid(format!(
                    "index {} out of range for {} entries",
                    index, total
                )));
            }
            if !seen.insert(index) {
                return Err(ReconError::invalid(format!(
                    "index {} observed more than once",
                    index
                )));
            }
        }
        if values.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
            return Err(ReconError::invalid("observed values must be finite"));
        }

        Ok(Self {
            dims,
            indices,
            values,
        })
    }

    /// Tensor shape the indices refer to
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of samples `m`
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always false: construction rejects empty sample sets
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Linear sample positions `K`
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Observed values, aligned with [`indices`](Self::indices)
    pub fn values(&self) -> &Array1<Complex64> {
        &self.values
    }

    /// Inverse sampling ratio `α = N / m`
    pub fn inverse_sampling_ratio(&self) -> f64 {
        self.dims.iter().product::<usize>() as f64 / self.len() as f64
    }

    /// Zero tensor carrying `scale · values` at the sampled positions
    pub fn zero_filled(&self, scale: f64) -> Array3<Complex64> {
        let mut x = Array3::zeros((self.dims[0], self.dims[1], self.dims[2]));
        for (&index, &value) in self.indices.iter().zip(self.values.iter()) {
            x[self.unravel(index)] = value * scale;
        }
        x
    }

    /// Data-consistency step `x[K] ← b + (1 - α)·x[K]` with `b = α·values`
    pub fn gradient_step(&self, x: &mut Array3<Complex64>, alpha: f64) {
        let keep = 1.0 - alpha;
        for (&index, &value) in self.indices.iter().zip(self.values.iter()) {
            let at = self.unravel(index);
            x[at] = value * alpha + x[at] * keep;
        }
    }

    /// Values of `x` at the sampled positions
    pub fn sample(&self, x: &Array3<Complex64>) -> Array1<Complex64> {
        self.indices.iter().map(|&index| x[self.unravel(index)]).collect()
    }

    fn unravel(&self, index: usize) -> [usize; 3] {
        let [_, n2, n3] = self.dims;
        [index / (n2 * n3), (index / n3) % n2, index % n3]
    }
}
