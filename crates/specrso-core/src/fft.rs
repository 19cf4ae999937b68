//! 3-D Fourier transforms on complex tensors
//!
//! Thin wrappers around `scirs2_fft::{fftn, ifftn}` that keep the
//! `Array3<Complex64>` type at the call sites. The forward transform is
//! unnormalized and the inverse carries the `1/N` factor, so
//! `ifftn3(fftn3(x)) == x`.

use crate::error::{CoreError, CoreResult};
use scirs2_core::ndarray_ext::{Array3, ArrayD};
use scirs2_core::numeric::Complex64;

/// Forward 3-D FFT
pub fn fftn3(x: &Array3<Complex64>) -> CoreResult<Array3<Complex64>> {
    use scirs2_fft::fftn;

    let array: ArrayD<Complex64> = x.clone().into_dyn();
    let spectrum =
        fftn(&array, None, None, None, None, None).map_err(|e| CoreError::Fft(e.to_string()))?;

    from_dyn(x.dim(), spectrum.iter().copied().collect())
}

/// Inverse 3-D FFT
pub fn ifftn3(x: &Array3<Complex64>) -> CoreResult<Array3<Complex64>> {
    use scirs2_fft::ifftn;

    let array: ArrayD<Complex64> = x.clone().into_dyn();
    let signal =
        ifftn(&array, None, None, None, None, None).map_err(|e| CoreError::Fft(e.to_string()))?;

    from_dyn(x.dim(), signal.iter().copied().collect())
}

fn from_dyn(
    dim: (usize, usize, usize),
    data: Vec<Complex64>,
) -> CoreResult<Array3<Complex64>> {
    Array3::from_shape_vec(dim, data).map_err(|e| CoreError::Fft(e.to_string()))
}

/// Copy `x` into the origin corner of a zero tensor of shape `dims`
pub fn zero_pad(x: &Array3<Complex64>, dims: [usize; 3]) -> CoreResult<Array3<Complex64>> {
    let (n1, n2, n3) = x.dim();
    if n1 > dims[0] || n2 > dims[1] || n3 > dims[2] {
        return Err(CoreError::InvalidShape(format!(
            "cannot pad {:?} into {:?}",
            [n1, n2, n3],
            dims
        )));
    }

    let mut padded = Array3::zeros((dims[0], dims[1], dims[2]));
    for ((i, j, k), &value) in x.indexed_iter() {
        padded[[i, j, k]] = value;
    }
    Ok(padded)
}
