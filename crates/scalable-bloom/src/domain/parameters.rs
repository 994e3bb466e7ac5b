//! Bloom filter parameter derivation
//!
//! Formulas:
//! - m = round(-n * ln(p) / (ln(2)^2))  -- bits, rounded to nearest
//! - k = ceil(ln(2) * m / n)            -- index rounds, rounded up
//! - FPR = (1 - e^(-kn/m))^k            -- expected rate after n inserts
//!
//! These are the only places where set size, memory and error rate meet.

use std::f64::consts::LN_2;

/// Ratio by which each successive member of a scalable chain tightens its
/// failure rate. The geometric series `sum(r^(i+1))` for this ratio stays
/// below 1, so a chain never exceeds its base failure rate.
pub const ERROR_TIGHTENING_RATIO: f64 = LN_2 * LN_2;

/// Derived parameters for a single fixed-size filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
    /// Number of bits in the filter (m)
    pub num_bits: usize,
    /// Number of index rounds per operation (k)
    pub hash_count: usize,
    /// Expected false positive rate once `capacity` keys are inserted
    pub expected_fpr: f64,
}

/// Number of bits needed to hold `capacity` keys at `failure_rate`.
///
/// Rounds to the nearest integer and never returns less than 1. A capacity
/// of 0 is treated as 1 and the failure rate is clamped into (0, 1).
pub fn required_bits(capacity: usize, failure_rate: f64) -> usize {
    let n = capacity.max(1) as f64;
    let p = sanitize_rate(failure_rate);
    let m = (-(n * p.ln()) / ERROR_TIGHTENING_RATIO).round();
    (m as usize).max(1)
}

/// Number of index rounds for a filter of `num_bits` bits holding `capacity` keys.
///
/// Rounds up and never returns less than 1.
pub fn required_hashes(capacity: usize, num_bits: usize) -> usize {
    let n = capacity.max(1) as f64;
    let k = (LN_2 * num_bits as f64 / n).ceil();
    (k as usize).max(1)
}

/// Derive the complete parameter set for `capacity` keys at `failure_rate`
pub fn calculate_optimal_parameters(capacity: usize, failure_rate: f64) -> FilterParams {
    let num_bits = required_bits(capacity, failure_rate);
    let hash_count = required_hashes(capacity, num_bits);

    FilterParams {
        num_bits,
        hash_count,
        expected_fpr: calculate_fpr(num_bits, capacity, hash_count),
    }
}

/// False positive rate of a filter with `m` bits and `k` rounds after `n` inserts
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}

/// Failure rate of the member at `index` in a chain configured for `base_rate`
pub fn member_failure_rate(base_rate: f64, index: usize) -> f64 {
    base_rate * ERROR_TIGHTENING_RATIO.powi(index as i32 + 1)
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_nan() || rate <= 0.0 {
        f64::MIN_POSITIVE
    } else if rate >= 1.0 {
        1.0 - f64::EPSILON
    } else {
        rate
    }
}
