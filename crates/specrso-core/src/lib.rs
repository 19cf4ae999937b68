//! # specrso-core
//!
//! Tensor geometry and the matrix-free multi-level Hankel lifting for SpecRSo.
//!
//! A spectrally sparse 3-D signal (a sum of `r` damped complex exponentials
//! along each axis) becomes a rank-`r` matrix when lifted into its
//! multi-level Hankel form. This crate provides everything needed to work with
//! that lifted matrix without ever storing it:
//!
//! - **Planning** ([`HankelPlan`]): per-axis half dimensions `p`, `q`, the
//!   symmetric/general case split, and the multiplicity tensor `DD`
//! - **Index maps** ([`IndexMaps`]): gather/scatter tables between lifted
//!   blocks and the tensor grid
//! - **Hankel operator** ([`HankelOperator`]): forward, transpose and adjoint
//!   products via 3-D FFTs
//! - **Convolution** ([`convolve3d`]): folds low-rank lifted factors back onto
//!   the tensor grid
//!
//! ## Quick Start
//!
//! ```
//! use scirs2_core::ndarray_ext::{Array1, Array3};
//! use scirs2_core::numeric::Complex64;
//! use specrso_core::{HankelOperator, HankelPlan, IndexMaps};
//!
//! let plan = HankelPlan::new([5, 5, 5]).unwrap();
//! let maps = IndexMaps::new(&plan).unwrap();
//!
//! let x = Array3::from_elem((5, 5, 5), Complex64::new(1.0, 0.0));
//! let op = HankelOperator::new(&plan, &maps, &x).unwrap();
//!
//! let z = Array1::from_elem(plan.ncols(), Complex64::new(1.0, 0.0));
//! let y = op.apply_forward(z.view()).unwrap();
//! // Every row of H(ones) sums to the column count
//! assert!((y[0].re - plan.ncols() as f64).abs() < 1e-9);
//! ```
//!
//! ## Memory Layout
//!
//! Tensors are row-major (C order): the linear index of `(i1, i2, i3)` is
//! `(i1·n2 + i2)·n3 + i3`. Lifted block vectors use the same ordering over
//! their block shape.
//!
//! ## SciRS2 Integration
//!
//! Arrays and complex scalars come from `scirs2-core`; Fourier transforms
//! from `scirs2-fft`.
//!
//! ## Features
//!
//! - `serde`: Enable serialization of plan metadata

#![deny(warnings)]

pub mod convolution;
pub mod error;
pub mod fft;
pub mod index_map;
pub mod operator;
pub mod plan;


pub use convolution::{
    convolve3d, convolve3d_direct, full_shape, Convolver, DirectConvolver, FftConvolver,
};
pub use error::{CoreError, CoreResult};
pub use fft::{fftn3, ifftn3, zero_pad};
pub use index_map::{IndexMap, IndexMaps};
pub use operator::{dense_hankel, HankelOperator, LinearOperator};
pub use plan::{linear_index, AxisPlan, HankelPlan, LiftCase};
