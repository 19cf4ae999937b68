//! Full linear 3-D convolution of complex tensors
//!
//! Folding a rank-one lifted term `u vᵀ` back onto the tensor grid sums
//! `u[a] v[b]` over all `a + b = k`, which is exactly the full linear
//! convolution of the two block tensors. Two backends are provided:
//!
//! - [`FftConvolver`]: zero-pads both operands to the output shape and
//!   multiplies spectra. O(N log N).
//! - [`DirectConvolver`]: the literal quadruple sum. O(|a|·|b|), used as a
//!   reference in tests and for very small operands.
//!
//! The output shape is `a.shape + b.shape - 1` per axis. With a row block
//! `p` and a column block `q = n + 1 - p` this is the tensor shape `n`, so the
//! circular convolution on the output grid never wraps.

use crate::error::{CoreError, CoreResult};
use crate::fft::{fftn3, ifftn3, zero_pad};
use scirs2_core::ndarray_ext::{Array3, Zip};
use scirs2_core::numeric::Complex64;
use std::fmt;

/// Full linear 3-D convolution backend
pub trait Convolver: fmt::Debug {
    /// Compute `a * b` with output shape `a.shape + b.shape - 1`
    fn convolve(&self, a: &Array3<Complex64>, b: &Array3<Complex64>)
        -> CoreResult<Array3<Complex64>>;
}

/// FFT-based convolution
#[derive(Debug, Clone, Copy, Default)]
pub struct FftConvolver;

/// Direct summation convolution
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectConvolver;

/// Output shape of a full linear convolution
pub fn full_shape(a: (usize, usize, usize), b: (usize, usize, usize)) -> CoreResult<[usize; 3]> {
    if [a.0, a.1, a.2, b.0, b.1, b.2].contains(&0) {
        return Err(CoreError::InvalidShape(
            "convolution operands must be non-empty".to_string(),
        ));
    }
    Ok([a.0 + b.0 - 1, a.1 + b.1 - 1, a.2 + b.2 - 1])
}

impl Convolver for FftConvolver {
    fn convolve(
        &self,
        a: &Array3<Complex64>,
        b: &Array3<Complex64>,
    ) -> CoreResult<Array3<Complex64>> {
        let shape = full_shape(a.dim(), b.dim())?;

        let mut spectrum = fftn3(&zero_pad(a, shape)?)?;
        let b_hat = fftn3(&zero_pad(b, shape)?)?;
        Zip::from(&mut spectrum)
            .and(&b_hat)
            .for_each(|s, &t| *s *= t);

        ifftn3(&spectrum)
    }
}

impl Convolver for DirectConvolver {
    fn convolve(
        &self,
        a: &Array3<Complex64>,
        b: &Array3<Complex64>,
    ) -> CoreResult<Array3<Complex64>> {
        let shape = full_shape(a.dim(), b.dim())?;
        let mut out = Array3::zeros((shape[0], shape[1], shape[2]));

        for ((i1, i2, i3), &av) in a.indexed_iter() {
            if av == Complex64::new(0.0, 0.0) {
                continue;
            }
            for ((j1, j2, j3), &bv) in b.indexed_iter() {
                out[[i1 + j1, i2 + j2, i3 + j3]] += av * bv;
            }
        }

        Ok(out)
    }
}

/// FFT-based full linear convolution
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array3;
/// use scirs2_core::numeric::Complex64;
/// use specrso_core::convolve3d;
///
/// let one = Complex64::new(1.0, 0.0);
/// let a = Array3::from_elem((2, 2, 2), one);
/// let c = convolve3d(&a, &a).unwrap();
/// assert_eq!(c.dim(), (3, 3, 3));
/// assert!((c[[1, 1, 1]] - Complex64::new(8.0, 0.0)).norm() < 1e-12);
/// ```
pub fn convolve3d(
    a: &Array3<Complex64>,
    b: &Array3<Complex64>,
) -> CoreResult<Array3<Complex64>> {
    FftConvolver.convolve(a, b)
}

/// Direct-summation full linear convolution
pub fn convolve3d_direct(
    a: &Array3<Complex64>,
    b: &Array3<Complex64>,
) -> CoreResult<Array3<Complex64>> {
    DirectConvolver.convolve(a, b)
}
