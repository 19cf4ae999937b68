//! Energy-based rank adaptation
//!
//! After each subspace update the working rank `r` shrinks by the number of
//! trailing retained singular values whose cumulative share of the full
//! spectrum's energy (sum of singular values) falls below a threshold tied
//! to machine precision. The rank never grows.

/// Truncation threshold `ε = machine epsilon · l1 · l2`
pub fn rank_threshold(nrows: usize, ncols: usize) -> f64 {
    f64::EPSILON * nrows as f64 * ncols as f64
}

/// Adapted rank for a decreasing `spectrum` (length at least `rank`)
///
/// With `s = spectrum[..rank]` and `E = Σ spectrum`, the trailing tail sums
/// `Σ_{i ≥ j} s_i / E` are compared against `epsilon`; every trailing index
/// whose tail ratio is below it is dropped. A spectrum with zero or
/// non-finite energy adapts to rank 0.
///
/// # Examples
///
/// ```
/// use specrso_recon::adapt_rank;
///
/// assert_eq!(adapt_rank(&[3.0, 1.0, 1e-20, 0.0], 3, 1e-12), 2);
/// assert_eq!(adapt_rank(&[3.0, 1.0, 0.5, 0.1], 3, 1e-12), 3);
/// assert_eq!(adapt_rank(&[0.0, 0.0], 1, 1e-12), 0);
/// ```
pub fn adapt_rank(spectrum: &[f64], rank: usize, epsilon: f64) -> usize {
    let rank = rank.min(spectrum.len());
    let energy: f64 = spectrum.iter().sum();
    if !(energy.is_finite() && energy > 0.0) {
        return 0;
    }

    let mut tail = 0.0;
    let mut dropped = 0;
    for &value in spectrum[..rank].iter().rev() {
        tail += value;
        if tail / energy < epsilon {
            dropped += 1;
        } else {
            break;
        }
    }
    rank - dropped
}
