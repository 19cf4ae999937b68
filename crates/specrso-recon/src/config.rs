//! Run parameters for the reconstruction loop

use crate::error::{ReconError, ReconResult};

/// Parameters of one reconstruction run
///
/// # Examples
///
/// ```
/// use specrso_recon::ReconConfig;
///
/// let config = ReconConfig::new(2).with_max_iters(500).with_tol(1e-9);
/// assert_eq!(config.rank, 2);
/// assert!(config.validate().is_ok());
/// assert!(ReconConfig::new(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconConfig {
    /// Initial working rank `r` (non-increasing during the run)
    pub rank: usize,

    /// Iteration budget
    pub max_iters: usize,

    /// Success threshold on the relative change between estimates
    pub tol: f64,

    /// Emit one progress line per iteration at `info` level
    pub trace: bool,

    /// Relative residual tolerance of the bootstrap truncated SVD
    pub svd_tol: f64,

    /// Seed of the truncated SVD start vector
    pub seed: u64,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            rank: 1,
            max_iters: 100,
            tol: 1e-7,
            trace: false,
            svd_tol: 1e-16,
            seed: 42,
        }
    }
}

impl ReconConfig {
    /// Defaults with the given initial rank
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            ..Default::default()
        }
    }

    /// Set the iteration budget
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the success threshold
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Enable or disable per-iteration progress lines
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Set the bootstrap truncated SVD tolerance
    pub fn with_svd_tol(mut self, svd_tol: f64) -> Self {
        self.svd_tol = svd_tol;
        self
    }

    /// Set the truncated SVD seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the shape-independent parameters
    pub fn validate(&self) -> ReconResult<()> {
        if self.rank == 0 {
            return Err(ReconError::invalid("rank must be at least 1"));
        }
        if self.max_iters == 0 {
            return Err(ReconError::invalid("max_iters must be at least 1"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(ReconError::invalid(format!(
                "tol must be positive and finite, got {}",
                self.tol
            )));
        }
        if !(self.svd_tol.is_finite() && self.svd_tol >= 0.0) {
            return Err(ReconError::invalid(format!(
                "svd_tol must be non-negative and finite, got {}",
                self.svd_tol
            )));
        }
        Ok(())
    }
}
