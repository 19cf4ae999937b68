//! Error types for dense and iterative linear algebra kernels

use specrso_core::CoreError;
use thiserror::Error;

/// Error type for kernel operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Operand shapes incompatible with the requested factorization
    #[error("{operation}: dimension mismatch - {context}")]
    DimensionMismatch {
        operation: &'static str,
        context: String,
    },

    /// Requested rank outside `1..=min(rows, cols)`
    #[error("{operation}: invalid rank {rank} (must be in 1..={max_rank})")]
    InvalidRank {
        operation: &'static str,
        rank: usize,
        max_rank: usize,
    },

    /// Input contained NaN or infinite entries
    #[error("{operation}: input contains non-finite values")]
    NonFinite { operation: &'static str },

    /// A backend factorization failed
    #[error("{operation}: decomposition failed - {message}")]
    Decomposition {
        operation: &'static str,
        message: String,
    },

    /// The operator product failed
    #[error("Operator error: {0}")]
    Operator(#[from] CoreError),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(operation: &'static str, context: impl Into<String>) -> Self {
        KernelError::DimensionMismatch {
            operation,
            context: context.into(),
        }
    }
}
