//! # specrso-recon
//!
//! Reconstruction of spectrally sparse 3-D signals from sparse samples.
//!
//! A tensor that is a sum of `r` damped complex exponentials along each axis
//! has a rank-`r` multi-level Hankel lifting. Starting from the zero-filled,
//! inverse-probability-scaled samples, the solver alternates a
//! data-consistency gradient step with a rank-adaptive low-rank projection of
//! the lifting, computed matrix-free through
//! [`HankelOperator`](specrso_core::HankelOperator):
//!
//! - **Bootstrap**: truncated Lanczos SVD of the initial lifting
//! - **Subspace update** ([`LowRankStrategy`]): tangent-space QR and a
//!   `2r×2r` SVD, one strategy per lifting case
//!   ([`SymmetricStrategy`], [`GeneralStrategy`])
//! - **Rank adaptation** ([`adapt_rank`]): drops trailing directions whose
//!   energy share is below machine precision
//! - **Monitoring** ([`ConvergenceMonitor`]): success, divergence or budget
//!
//! ## Quick Start
//!
//! ```
//! use scirs2_core::numeric::Complex64;
//! use specrso_recon::{reconstruct, Outcome, ReconConfig};
//!
//! // One complex exponential on a 5×5×5 grid, every entry observed
//! let dims = [5, 5, 5];
//! let mut signal = Vec::new();
//! for i in 0..5 {
//!     for j in 0..5 {
//!         for k in 0..5 {
//!             let phase = 0.4 * i as f64 - 0.9 * j as f64 + 0.25 * k as f64;
//!             signal.push(Complex64::from_polar(1.0, phase));
//!         }
//!     }
//! }
//! let indices: Vec<usize> = (0..signal.len()).collect();
//!
//! let report = reconstruct(&signal, dims, &indices, &ReconConfig::new(1)).unwrap();
//! assert_eq!(report.outcome(), Outcome::Converged);
//! ```
//!
//! ## Logging
//!
//! Progress is reported through `tracing`. Setup details are `debug`
//! events; per-iteration progress is `trace`, or `info` when
//! [`ReconConfig::trace`] is set. No subscriber is installed by the library.
//!
//! ## Features
//!
//! - `serde`: Enable serialization of [`ReconConfig`], [`Outcome`] and
//!   [`ReconReport`]

#![deny(warnings)]

pub mod config;
pub mod error;
pub mod general;
pub mod monitor;
pub mod observations;
pub mod rank;
pub mod reconstruct;
pub mod strategy;
pub mod symmetric;


pub use config::ReconConfig;
pub use error::{ReconError, ReconResult};
pub use general::GeneralStrategy;
pub use monitor::{relative_change, relative_error, ConvergenceMonitor, Verdict};
pub use observations::Observations;
pub use rank::{adapt_rank, rank_threshold};
pub use reconstruct::{reconstruct, Outcome, ReconReport, Reconstructor};
pub use strategy::{strategy_for, Factors, Lifting, LowRankStrategy};
pub use symmetric::SymmetricStrategy;
