//! Helpers for tests.

use crate::functions::aggregate::partial::PartialResult;

/// Relative tolerance used when comparing accumulated floats.
pub const TOLERANCE: f64 = 1e-9;

/// Check `got` is within relative tolerance of `expected`.
///
/// Values near zero are compared with the tolerance as an absolute bound.
pub fn is_close(expected: f64, got: f64) -> bool {
    let scale = expected.abs().max(1.0);
    (expected - got).abs() <= TOLERANCE * scale
}

#[track_caller]
pub fn assert_close(expected: f64, got: f64) {
    assert!(is_close(expected, got), "expected {expected}, got {got}");
}

/// Reference sum of squared deviations computed in two passes.
pub fn two_pass_sum_sq_dev(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

/// Reference partial result computed in two passes.
pub fn partial_from_values(values: &[f64]) -> PartialResult {
    PartialResult {
        count: values.len() as i64,
        sum: values.iter().sum(),
        sum_sq_dev: two_pass_sum_sq_dev(values),
    }
}
