//! Integration tests for spectrally sparse reconstruction
//!
//! These tests run the full loop on synthetic sums of complex exponentials
//! and check recovery quality, rank adaptation, determinism and input
//! validation through the public API.

use scirs2_core::numeric::Complex64;
use specrso_recon::{reconstruct, Outcome, ReconConfig, ReconError};

/// `Σ_c amp_c · Π_axis z_{c,axis}^{i_axis}` in row-major order
fn exponentials(dims: [usize; 3], poles: &[(Complex64, [Complex64; 3])]) -> Vec<Complex64> {
    let mut values = Vec::with_capacity(dims.iter().product());
    for i in 0..dims[0] {
        for j in 0..dims[1] {
            for k in 0..dims[2] {
                let value = poles
                    .iter()
                    .map(|(amp, z)| {
                        amp * z[0].powu(i as u32) * z[1].powu(j as u32) * z[2].powu(k as u32)
                    })
                    .sum();
                values.push(value);
            }
        }
    }
    values
}

fn pole(freq: f64) -> Complex64 {
    Complex64::from_polar(1.0, std::f64::consts::TAU * freq)
}

fn single_exponential(dims: [usize; 3]) -> Vec<Complex64> {
    exponentials(
        dims,
        &[(Complex64::new(1.2, -0.4), [pole(0.13), pole(-0.27), pole(0.36)])],
    )
}

/// Deterministic pseudo-random mask keeping about `percent`% of the entries
fn hashed_mask(total: usize, percent: u64, salt: u64) -> Vec<usize> {
    (0..total)
        .filter(|&i| {
            let mut h = (i as u64 ^ salt).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            h ^= h >> 31;
            h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
            h ^= h >> 29;
            h % 100 < percent
        })
        .collect()
}

fn relative_error(estimate: &[Complex64], reference: &[Complex64]) -> f64 {
    let mut err_sq = 0.0;
    let mut ref_sq = 0.0;
    for (a, b) in estimate.iter().zip(reference.iter()) {
        err_sq += (a - b).norm_sqr();
        ref_sq += b.norm_sqr();
    }
    (err_sq / ref_sq).sqrt()
}

#[test]
fn test_exact_recovery_odd_shape_full_sampling() {
    let dims = [5, 5, 5];
    let truth = single_exponential(dims);
    let indices: Vec<usize> = (0..truth.len()).collect();

    let report = reconstruct(&truth, dims, &indices, &ReconConfig::new(1)).unwrap();

    assert!(report.success);
    assert_eq!(report.rank, 1);
    assert!(relative_error(&report.signal_flat(), &truth) < 1e-8);
}

#[test]
fn test_exact_recovery_even_shape_full_sampling() {
    let dims = [4, 4, 4];
    let truth = single_exponential(dims);
    let indices: Vec<usize> = (0..truth.len()).collect();

    let report = reconstruct(&truth, dims, &indices, &ReconConfig::new(1)).unwrap();

    assert!(report.success);
    assert_eq!(report.outcome(), Outcome::Converged);
    assert!(report.iterations <= 3);
    assert!(relative_error(&report.signal_flat(), &truth) < 1e-8);
}

#[test]
fn test_exact_recovery_odd_shape_repeated_singular_values() {
    // Constant and period-3 modes have orthogonal liftings on a 5×5×5 grid,
    // so equal amplitudes give a repeated singular value
    let dims = [5, 5, 5];
    let third = 1.0 / 3.0;
    for amplitude in [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)] {
        let truth = exponentials(
            dims,
            &[
                (Complex64::new(1.0, 0.0), [pole(0.0), pole(0.0), pole(0.0)]),
                (amplitude, [pole(third), pole(third), pole(third)]),
            ],
        );
        let indices: Vec<usize> = (0..truth.len()).collect();

        let report = reconstruct(&truth, dims, &indices, &ReconConfig::new(2)).unwrap();

        assert!(report.success, "amplitude {}: {:?}", amplitude, report.outcome());
        assert!(report.iterations <= 3);
        assert_eq!(report.rank, 2);
        assert!(relative_error(&report.signal_flat(), &truth) < 1e-8);
    }
}

#[test]
fn test_exact_recovery_mixed_parity_rank_two() {
    let dims = [4, 5, 6];
    let truth = exponentials(
        dims,
        &[
            (Complex64::new(1.0, 0.0), [pole(0.1), pole(0.2), pole(-0.3)]),
            (Complex64::new(0.0, 0.6), [pole(-0.25), pole(0.35), pole(0.15)]),
        ],
    );
    let indices: Vec<usize> = (0..truth.len()).collect();

    let report = reconstruct(&truth, dims, &indices, &ReconConfig::new(2)).unwrap();

    assert!(report.success);
    assert_eq!(report.rank, 2);
    assert!(relative_error(&report.signal_flat(), &truth) < 1e-8);
}

#[test]
fn test_recovery_from_partial_samples() {
    let dims = [7, 7, 7];
    let truth = single_exponential(dims);
    let indices = hashed_mask(truth.len(), 70, 11);
    let samples: Vec<Complex64> = indices.iter().map(|&i| truth[i]).collect();

    let config = ReconConfig::new(1).with_max_iters(1000).with_tol(1e-12);
    let report = reconstruct(&samples, dims, &indices, &config).unwrap();

    assert!(report.success, "outcome {:?}", report.outcome());
    assert!(relative_error(&report.signal_flat(), &truth) < 1e-6);

    // Observed entries are reproduced
    let estimate = report.signal_flat();
    for (&i, value) in indices.iter().zip(samples.iter()) {
        assert!((estimate[i] - value).norm() < 1e-6);
    }
}

#[test]
fn test_insufficient_samples_never_produce_nan() {
    let dims = [7, 7, 7];
    let truth = single_exponential(dims);
    let indices = vec![3, 200];
    let samples: Vec<Complex64> = indices.iter().map(|&i| truth[i]).collect();

    let config = ReconConfig::new(1).with_max_iters(50);
    match reconstruct(&samples, dims, &indices, &config) {
        Ok(report) => {
            assert!(report
                .signal
                .iter()
                .all(|z| z.re.is_finite() && z.im.is_finite()));
            assert_eq!(report.ratios.len(), report.iterations);
            assert!(report.iterations <= 50);
        }
        Err(err) => assert!(matches!(err, ReconError::DegenerateRank { .. })),
    }
}

#[test]
fn test_rank_overestimate_adapts_down() {
    let dims = [5, 5, 5];
    let truth = single_exponential(dims);
    let indices: Vec<usize> = (0..truth.len()).collect();

    let report = reconstruct(&truth, dims, &indices, &ReconConfig::new(3)).unwrap();

    assert_eq!(report.ranks.first().copied(), Some(3));
    assert!(report.rank < 3);
    assert!(relative_error(&report.signal_flat(), &truth) < 1e-8);
}

#[test]
fn test_runs_are_deterministic() {
    let dims = [6, 5, 5];
    let truth = single_exponential(dims);
    let indices = hashed_mask(truth.len(), 60, 3);
    let samples: Vec<Complex64> = indices.iter().map(|&i| truth[i]).collect();
    let config = ReconConfig::new(2).with_max_iters(40);

    let first = reconstruct(&samples, dims, &indices, &config).unwrap();
    let second = reconstruct(&samples, dims, &indices, &config).unwrap();

    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.ranks, second.ranks);
    assert_eq!(first.ratios.len(), second.ratios.len());
    for (a, b) in first.ratios.iter().zip(second.ratios.iter()) {
        assert!(a == b || (a.is_nan() && b.is_nan()));
    }
    assert_eq!(first.signal, second.signal);
}

#[test]
fn test_ranks_never_increase() {
    let dims = [7, 6, 5];
    let truth = exponentials(
        dims,
        &[
            (Complex64::new(1.0, 0.0), [pole(0.05), pole(0.4), pole(-0.2)]),
            (Complex64::new(0.3, 0.3), [pole(-0.3), pole(0.1), pole(0.25)]),
        ],
    );
    let indices = hashed_mask(truth.len(), 50, 5);
    let samples: Vec<Complex64> = indices.iter().map(|&i| truth[i]).collect();

    let config = ReconConfig::new(4).with_max_iters(60);
    let report = reconstruct(&samples, dims, &indices, &config).unwrap();

    assert!(report.ranks.windows(2).all(|w| w[1] <= w[0]));
    assert!(report.rank <= report.ranks.last().copied().unwrap_or(4));
}

#[test]
fn test_input_validation() {
    let dims = [3, 3, 3];
    let one = Complex64::new(1.0, 0.0);
    let config = ReconConfig::new(1);

    // Length mismatch
    assert!(matches!(
        reconstruct(&[one, one], dims, &[0], &config),
        Err(ReconError::InvalidInput(_))
    ));
    // Repeated index
    assert!(matches!(
        reconstruct(&[one, one], dims, &[4, 4], &config),
        Err(ReconError::InvalidInput(_))
    ));
    // Out of range
    assert!(matches!(
        reconstruct(&[one], dims, &[27], &config),
        Err(ReconError::InvalidInput(_))
    ));
    // Zero axis
    assert!(matches!(
        reconstruct(&[one], [3, 0, 3], &[0], &config),
        Err(ReconError::InvalidInput(_))
    ));
    // Rank zero and non-positive tolerance
    assert!(reconstruct(&[one], dims, &[0], &ReconConfig::new(0)).is_err());
    assert!(reconstruct(&[one], dims, &[0], &config.clone().with_tol(0.0)).is_err());
}

#[test]
fn test_zero_observations_report_degenerate_rank() {
    let dims = [4, 3, 3];
    let zeros = vec![Complex64::new(0.0, 0.0); 36];
    let indices: Vec<usize> = (0..36).collect();

    let err = reconstruct(&zeros, dims, &indices, &ReconConfig::new(1)).unwrap_err();
    assert_eq!(err, ReconError::DegenerateRank { iteration: 1 });
}
