//! Fast iterative hard thresholding on the multi-level Hankel lifting
//!
//! Each iteration performs:
//!
//! 1. a data-consistency gradient step `x[K] ← b + (1 - α)·x[K]` with
//!    `α = N/m` and `b = α·obs`;
//! 2. a tangent-space subspace update of the low-rank factorization of
//!    `H(x)`, with energy-based rank adaptation;
//! 3. reconstruction of the tensor from the updated factors;
//! 4. the convergence check on `‖x_new - x_old‖ / ‖x_old‖`.
//!
//! The run stops on success (`ratio < tol`), on divergence (`ratio > 1`, or a
//! non-finite estimate) or when the iteration budget is spent.

use crate::config::ReconConfig;
use crate::error::{ReconError, ReconResult};
use crate::monitor::{relative_change, ConvergenceMonitor, Verdict};
use crate::observations::Observations;
use crate::strategy::{strategy_for, Lifting, LowRankStrategy};
use scirs2_core::ndarray_ext::Array3;
use scirs2_core::numeric::Complex64;
use specrso_core::Convolver;
use specrso_kernels::{all_finite, KernelError};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Relative change fell below the tolerance
    Converged,
    /// Relative change exceeded 1 or the estimate became non-finite
    Diverged,
    /// Iteration budget spent
    Exhausted,
}

/// Result of one reconstruction run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconReport {
    /// Whether the run converged
    pub success: bool,
    /// Iterations executed
    pub iterations: usize,
    /// Relative change per executed iteration
    pub ratios: Vec<f64>,
    /// Working rank at the start of each executed iteration
    pub ranks: Vec<usize>,
    /// Working rank after the last iteration
    pub rank: usize,
    /// Final finite tensor estimate
    #[cfg_attr(feature = "serde", serde(skip))]
    pub signal: Array3<Complex64>,
}

impl ReconReport {
    /// Converged, diverged or exhausted, derived from the recorded history
    pub fn outcome(&self) -> Outcome {
        if self.success {
            Outcome::Converged
        } else if self.last_ratio().map_or(false, |r| r > 1.0 || r.is_nan()) {
            Outcome::Diverged
        } else {
            Outcome::Exhausted
        }
    }

    /// Ratio of the final iteration
    pub fn last_ratio(&self) -> Option<f64> {
        self.ratios.last().copied()
    }

    /// Final estimate flattened in row-major order
    pub fn signal_flat(&self) -> Vec<Complex64> {
        self.signal.iter().copied().collect()
    }
}

/// Reusable reconstruction for one tensor shape
///
/// Planning, index tables and the multiplicity tensor are built once; each
/// [`run`](Self::run) takes a fresh observation set of the same shape.
///
/// # Examples
///
/// ```
/// use scirs2_core::numeric::Complex64;
/// use specrso_recon::{Observations, ReconConfig, Reconstructor};
///
/// let dims = [3, 3, 3];
/// let signal: Vec<Complex64> = (0..27)
///     .map(|i| Complex64::from_polar(1.0, 0.3 * i as f64))
///     .collect();
/// let obs = Observations::new(dims, (0..27).collect(), signal).unwrap();
///
/// let recon = Reconstructor::new(dims, ReconConfig::new(1)).unwrap();
/// let report = recon.run(&obs).unwrap();
/// assert!(report.success);
/// ```
#[derive(Debug)]
pub struct Reconstructor {
    lifting: Lifting,
    strategy: Box<dyn LowRankStrategy>,
    config: ReconConfig,
}

impl Reconstructor {
    /// Validate `config` against the `dims` lifting and prepare the run
    ///
    /// The doubled subspace of the update must fit in the lifted matrix:
    /// `2·rank ≤ min(l1, l2)`.
    pub fn new(dims: [usize; 3], config: ReconConfig) -> ReconResult<Self> {
        config.validate()?;
        if dims.contains(&0) {
            return Err(ReconError::invalid(format!(
                "tensor shape {:?} has an empty axis",
                dims
            )));
        }

        let lifting = Lifting::new(dims)?;
        let plan = lifting.plan();
        let capacity = plan.nrows().min(plan.ncols());
        if 2 * config.rank > capacity {
            return Err(ReconError::invalid(format!(
                "rank {} too large for shape {:?}: 2·rank must not exceed {}",
                config.rank, dims, capacity
            )));
        }

        let strategy = strategy_for(plan);
        Ok(Self {
            lifting,
            strategy,
            config,
        })
    }

    /// Fold factors with a different convolution backend
    pub fn with_convolver(mut self, convolver: Box<dyn Convolver>) -> Self {
        self.lifting = self.lifting.with_convolver(convolver);
        self
    }

    /// Shape-dependent lifting state
    pub fn lifting(&self) -> &Lifting {
        &self.lifting
    }

    /// Run parameters
    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Reconstruct the full tensor from `obs`
    pub fn run(&self, obs: &Observations) -> ReconResult<ReconReport> {
        let plan = self.lifting.plan();
        if obs.dims() != plan.dims() {
            return Err(ReconError::invalid(format!(
                "observations are for shape {:?}, reconstructor for {:?}",
                obs.dims(),
                plan.dims()
            )));
        }

        let config = &self.config;
        let alpha = obs.inverse_sampling_ratio();
        tracing::debug!(
            case = ?plan.case(),
            rows = plan.nrows(),
            cols = plan.ncols(),
            samples = obs.len(),
            alpha,
            epsilon = self.lifting.epsilon(),
            rank = config.rank,
            "starting reconstruction"
        );

        let mut factors = self
            .strategy
            .initial_factorization(&self.lifting, &obs.zero_filled(alpha), config)?;
        let mut x = self.strategy.reconstruct(&self.lifting, &factors)?;

        let mut monitor = ConvergenceMonitor::new(config.tol, config.max_iters);
        let mut ranks = Vec::with_capacity(config.max_iters);

        let verdict = loop {
            let iteration = monitor.iterations() + 1;
            ranks.push(factors.rank());

            let mut stepped = x.clone();
            obs.gradient_step(&mut stepped, alpha);

            let updated = match self.strategy.update_subspace(&self.lifting, &stepped, &factors) {
                Ok(updated) => updated,
                Err(ReconError::Kernel(KernelError::NonFinite { operation })) => {
                    tracing::warn!(iteration, operation, "non-finite subspace update");
                    break monitor.observe(f64::INFINITY);
                }
                Err(e) => return Err(e),
            };
            if updated.rank() == 0 {
                tracing::warn!(iteration, "rank collapsed to zero");
                return Err(ReconError::DegenerateRank { iteration });
            }

            let candidate = self.strategy.reconstruct(&self.lifting, &updated)?;
            let ratio = if all_finite(candidate.iter()) {
                relative_change(&candidate, &x)
            } else {
                f64::INFINITY
            };

            if config.trace {
                tracing::info!(iteration, ratio, rank = updated.rank(), "reconstruction progress");
            } else {
                tracing::trace!(iteration, ratio, rank = updated.rank(), "reconstruction progress");
            }

            let verdict = monitor.observe(ratio);
            if ratio.is_finite() {
                x = candidate;
                factors = updated;
            }
            if verdict != Verdict::Continue {
                break verdict;
            }
        };

        let iterations = monitor.iterations();
        match verdict {
            Verdict::Converged => {
                tracing::info!(iterations, rank = factors.rank(), "reconstruction converged")
            }
            Verdict::Diverged => tracing::warn!(
                iterations,
                ratio = monitor.last_ratio().unwrap_or(f64::INFINITY),
                "reconstruction diverged"
            ),
            _ => tracing::debug!(
                iterations,
                ratio = monitor.last_ratio().unwrap_or(f64::NAN),
                "iteration budget exhausted"
            ),
        }

        Ok(ReconReport {
            success: verdict == Verdict::Converged,
            iterations,
            ratios: monitor.into_ratios(),
            ranks,
            rank: factors.rank(),
            signal: x,
        })
    }
}

/// Reconstruct a `dims` tensor from samples `obs[j]` at row-major `indices[j]`
///
/// All inputs are validated before any computation: lengths must match,
/// indices must be unique and in range, and the configuration must be valid
/// for the shape.
pub fn reconstruct(
    obs: &[Complex64],
    dims: [usize; 3],
    indices: &[usize],
    config: &ReconConfig,
) -> ReconResult<ReconReport> {
    let observations = Observations::new(dims, indices.to_vec(), obs.to_vec())?;
    Reconstructor::new(dims, config.clone())?.run(&observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use specrso_core::DirectConvolver;

    fn exponential(dims: [usize; 3]) -> Vec<Complex64> {
        let mut values = Vec::new();
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    let phase = 0.9 * i as f64 - 0.35 * j as f64 + 0.6 * k as f64;
                    values.push(Complex64::from_polar(2.0, phase));
                }
            }
        }
        values
    }

    #[test]
    fn test_rank_too_large_for_shape() {
        // 3x3x3 lifting is 8x8, so rank 5 cannot double
        let err = Reconstructor::new([3, 3, 3], ReconConfig::new(5)).unwrap_err();
        assert!(matches!(err, ReconError::InvalidInput(_)));
        assert!(Reconstructor::new([3, 3, 3], ReconConfig::new(4)).is_ok());
    }

    #[test]
    fn test_shape_mismatch_between_runs() {
        let recon = Reconstructor::new([3, 3, 3], ReconConfig::new(1)).unwrap();
        let obs = Observations::new([3, 3, 5], vec![0], vec![Complex64::new(1.0, 0.0)]).unwrap();
        assert!(recon.run(&obs).is_err());
    }

    #[test]
    fn test_full_sampling_converges_quickly() {
        let dims = [5, 3, 3];
        let values = exponential(dims);
        let indices: Vec<usize> = (0..values.len()).collect();

        let report = reconstruct(&values, dims, &indices, &ReconConfig::new(1)).unwrap();
        assert!(report.success);
        assert_eq!(report.outcome(), Outcome::Converged);
        assert!(report.iterations <= 3);
        assert_eq!(report.ratios.len(), report.iterations);
        assert_eq!(report.ranks.len(), report.iterations);

        for (a, b) in report.signal_flat().iter().zip(values.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_direct_convolver_gives_same_result() {
        let dims = [4, 3, 3];
        let values = exponential(dims);
        let obs = Observations::new(dims, (0..values.len()).collect(), values).unwrap();

        let fast = Reconstructor::new(dims, ReconConfig::new(1))
            .unwrap()
            .run(&obs)
            .unwrap();
        let slow = Reconstructor::new(dims, ReconConfig::new(1))
            .unwrap()
            .with_convolver(Box::new(DirectConvolver))
            .run(&obs)
            .unwrap();

        assert!(fast.success && slow.success);
        for (a, b) in fast.signal.iter().zip(slow.signal.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_zero_observations_collapse_rank() {
        let dims = [3, 3, 3];
        let zeros = vec![Complex64::new(0.0, 0.0); 27];
        let indices: Vec<usize> = (0..27).collect();

        let err = reconstruct(&zeros, dims, &indices, &ReconConfig::new(1)).unwrap_err();
        assert_eq!(err, ReconError::DegenerateRank { iteration: 1 });
    }

    #[test]
    fn test_outcome_classification() {
        let report = |success: bool, ratios: Vec<f64>| ReconReport {
            success,
            iterations: ratios.len(),
            ranks: vec![1; ratios.len()],
            ratios,
            rank: 1,
            signal: Array3::zeros((1, 1, 1)),
        };
        assert_eq!(report(true, vec![1e-9]).outcome(), Outcome::Converged);
        assert_eq!(report(false, vec![0.5, 2.0]).outcome(), Outcome::Diverged);
        assert_eq!(report(false, vec![0.5, f64::INFINITY]).outcome(), Outcome::Diverged);
        assert_eq!(report(false, vec![0.5, 0.4]).outcome(), Outcome::Exhausted);
    }
}
