//! # SpecRSo - Spectrally Sparse Signal Reconstruction
//!
//! Recovery of 3-D signals made of a few damped complex exponentials from a
//! subset of their samples, by rank-adaptive iterative hard thresholding on a
//! matrix-free multi-level Hankel lifting.
//!
//! This is the **meta crate** that re-exports all SpecRSo components for convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use specrso::prelude::*;
//!
//! let dims = [3, 3, 3];
//! let signal: Vec<Complex64> = (0..27)
//!     .map(|i| {
//!         let (a, b, c) = (i / 9, (i / 3) % 3, i % 3);
//!         Complex64::from_polar(1.0, 0.5 * a as f64 + 0.2 * b as f64 - 0.7 * c as f64)
//!     })
//!     .collect();
//! let indices: Vec<usize> = (0..27).collect();
//!
//! let report = reconstruct(&signal, dims, &indices, &ReconConfig::new(1))?;
//! assert!(report.success);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Lifting Geometry ([`core`])
//!
//! Per-axis half dimensions, index maps, multiplicity and the matrix-free
//! Hankel operator.
//!
//! ```
//! use specrso::core::{HankelPlan, LiftCase};
//!
//! let plan = HankelPlan::new([5, 4, 3]).unwrap();
//! assert_eq!(plan.case(), LiftCase::General);
//! assert_eq!((plan.nrows(), plan.ncols()), (3 * 2 * 2, 3 * 3 * 2));
//! ```
//!
//! ### Linear Algebra Kernels ([`kernels`])
//!
//! Complex QR, Jacobi SVD and Lanczos truncated SVD.
//!
//! ```
//! use scirs2_core::ndarray_ext::Array2;
//! use scirs2_core::numeric::Complex64;
//! use specrso::kernels::svd;
//!
//! let a = Array2::from_elem((4, 2), Complex64::new(1.0, 0.0));
//! let dec = svd(&a.view()).unwrap();
//! assert!((dec.s[0] - 8f64.sqrt()).abs() < 1e-12);
//! ```
//!
//! ### Reconstruction ([`recon`])
//!
//! Bootstrap, subspace updates, rank adaptation and convergence monitoring.
//!
//! ## Features
//!
//! - `serde`: Enable serialization of configurations and reports

#![deny(warnings)]

// Re-export all components
pub use specrso_core as core;
pub use specrso_kernels as kernels;
pub use specrso_recon as recon;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use specrso::prelude::*;
    //!
    //! let config = ReconConfig::new(2).with_max_iters(200);
    //! assert!(config.validate().is_ok());
    //! ```

    // Scalars
    pub use scirs2_core::numeric::Complex64;

    // Geometry
    pub use crate::core::{HankelOperator, HankelPlan, LiftCase, LinearOperator};

    // Kernels
    pub use crate::kernels::{qr, svd, truncated_svd};

    // Reconstruction
    pub use crate::recon::{
        reconstruct, Observations, Outcome, ReconConfig, ReconError, ReconReport, Reconstructor,
    };
}
