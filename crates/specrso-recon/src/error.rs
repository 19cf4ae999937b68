//! Error types for spectrally sparse reconstruction

use specrso_core::CoreError;
use specrso_kernels::KernelError;
use thiserror::Error;

/// Error type for reconstruction runs
///
/// Divergence and an exhausted iteration budget are outcomes, not errors;
/// they are reported through [`ReconReport`](crate::ReconReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Inputs rejected before any computation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rank adaptation removed every singular direction
    #[error("Rank collapsed to zero at iteration {iteration}")]
    DegenerateRank { iteration: usize },

    /// Lifting geometry or operator failure
    #[error("Lifting error: {0}")]
    Core(#[from] CoreError),

    /// Factorization failure
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Result type for reconstruction runs
pub type ReconResult<T> = Result<T, ReconError>;

impl ReconError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        ReconError::InvalidInput(message.into())
    }
}
