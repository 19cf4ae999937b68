//! Error types for lifting and Fourier-domain operations

use thiserror::Error;

/// Error type for `specrso-core` operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Tensor dimensions that cannot be lifted (zero-length axes, wrong rank)
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Operand length does not match the block it is applied to
    #[error("{operation}: expected length {expected}, got {actual}")]
    LengthMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The FFT backend rejected the input
    #[error("FFT failed: {0}")]
    Fft(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a length mismatch error
    pub fn length_mismatch(operation: &'static str, expected: usize, actual: usize) -> Self {
        CoreError::LengthMismatch {
            operation,
            expected,
            actual,
        }
    }
}
