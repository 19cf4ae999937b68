//! Convergence monitoring between successive tensor estimates

use scirs2_core::ndarray_ext::Array3;
use scirs2_core::numeric::Complex64;

/// Decision after recording one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep iterating
    Continue,
    /// Relative change fell below the tolerance
    Converged,
    /// Relative change exceeded 1 (or was not finite)
    Diverged,
    /// Iteration budget spent without either of the above
    Exhausted,
}

/// `‖new - old‖_F / ‖old‖_F`
///
/// An unchanged zero estimate has ratio 0; any change away from zero, or a
/// non-finite difference, has ratio `+∞`.
pub fn relative_change(new: &Array3<Complex64>, old: &Array3<Complex64>) -> f64 {
    let mut diff_sq = 0.0;
    let mut old_sq = 0.0;
    for (a, b) in new.iter().zip(old.iter()) {
        diff_sq += (a - b).norm_sqr();
        old_sq += b.norm_sqr();
    }

    if !diff_sq.is_finite() {
        return f64::INFINITY;
    }
    if old_sq == 0.0 {
        return if diff_sq == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (diff_sq / old_sq).sqrt()
}

/// `‖estimate - reference‖_F / ‖reference‖_F`
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array3;
/// use scirs2_core::numeric::Complex64;
/// use specrso_recon::relative_error;
///
/// let reference = Array3::from_elem((2, 2, 2), Complex64::new(2.0, 0.0));
/// let estimate = Array3::from_elem((2, 2, 2), Complex64::new(2.0, 0.2));
/// assert!((relative_error(&estimate, &reference) - 0.1).abs() < 1e-12);
/// ```
pub fn relative_error(estimate: &Array3<Complex64>, reference: &Array3<Complex64>) -> f64 {
    relative_change(estimate, reference)
}

/// Records relative changes and decides when the loop stops
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    tol: f64,
    max_iters: usize,
    ratios: Vec<f64>,
}

impl ConvergenceMonitor {
    /// Monitor with success threshold `tol` and budget `max_iters`
    pub fn new(tol: f64, max_iters: usize) -> Self {
        Self {
            tol,
            max_iters,
            ratios: Vec::with_capacity(max_iters),
        }
    }

    /// Record the ratio of the iteration just finished
    pub fn observe(&mut self, ratio: f64) -> Verdict {
        self.ratios.push(ratio);

        if ratio < self.tol {
            Verdict::Converged
        } else if ratio > 1.0 || ratio.is_nan() {
            Verdict::Diverged
        } else if self.ratios.len() >= self.max_iters {
            Verdict::Exhausted
        } else {
            Verdict::Continue
        }
    }

    /// Iterations recorded so far
    pub fn iterations(&self) -> usize {
        self.ratios.len()
    }

    /// Ratio of the most recent iteration
    pub fn last_ratio(&self) -> Option<f64> {
        self.ratios.last().copied()
    }

    /// Recorded ratio history, one entry per executed iteration
    pub fn into_ratios(self) -> Vec<f64> {
        self.ratios
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(value: f64) -> Array3<Complex64> {
        Array3::from_elem((2, 2, 1), Complex64::new(value, 0.0))
    }

    #[test]
    fn test_relative_change() {
        assert!((relative_change(&filled(1.5), &filled(1.0)) - 0.5).abs() < 1e-15);
        assert_eq!(relative_change(&filled(0.0), &filled(0.0)), 0.0);
        assert_eq!(relative_change(&filled(1.0), &filled(0.0)), f64::INFINITY);
        assert_eq!(
            relative_change(&filled(f64::NAN), &filled(1.0)),
            f64::INFINITY
        );
    }

    #[test]
    fn test_monitor_converges() {
        let mut monitor = ConvergenceMonitor::new(1e-6, 10);
        assert_eq!(monitor.observe(0.5), Verdict::Continue);
        assert_eq!(monitor.observe(1e-7), Verdict::Converged);
        assert_eq!(monitor.iterations(), 2);
        assert_eq!(monitor.into_ratios(), vec![0.5, 1e-7]);
    }

    #[test]
    fn test_monitor_diverges_above_one() {
        let mut monitor = ConvergenceMonitor::new(1e-6, 10);
        assert_eq!(monitor.observe(1.0), Verdict::Continue);
        assert_eq!(monitor.observe(1.5), Verdict::Diverged);
        assert_eq!(monitor.last_ratio(), Some(1.5));

        let mut monitor = ConvergenceMonitor::new(1e-6, 10);
        assert_eq!(monitor.observe(f64::NAN), Verdict::Diverged);
    }

    #[test]
    fn test_monitor_exhausts_budget() {
        let mut monitor = ConvergenceMonitor::new(1e-6, 2);
        assert_eq!(monitor.observe(0.5), Verdict::Continue);
        assert_eq!(monitor.observe(0.4), Verdict::Exhausted);
    }
}
