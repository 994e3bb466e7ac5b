//! Empirical false positive measurement.
//!
//! A trial inserts keys `offset .. offset + n` into a fresh filter, then
//! queries the disjoint keys `offset + n .. offset + 2n`. Every positive
//! answer for the second range is a false positive.

use std::time::Instant;

use scalable_bloom::{MembershipFilter, MetricsRecorder};
use serde::Serialize;
use thiserror::Error;

/// Errors raised before any filter is touched
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarnessError {
    #[error("sample size must be at least 1")]
    EmptySample,

    #[error("at least one trial is required")]
    NoTrials,

    #[error("key range overflows u64: {trials} trials of {sample_size} keys")]
    KeyRangeOverflow { sample_size: u64, trials: usize },
}

/// Outcome of a single trial
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialResult {
    /// Zero-based trial index
    pub trial: usize,
    /// First key inserted by this trial
    pub first_key: u64,
    /// Inserts that reported a new key
    pub inserted_new: u64,
    /// Filter count after the insert phase
    pub count: usize,
    /// Known non-members reported present
    pub false_positives: u64,
    /// `false_positives / sample_size`
    pub observed_rate: f64,
    /// The filter's own estimate after the insert phase
    pub estimated_rate: f64,
}

/// Run one trial against `filter`.
///
/// `estimate` reads the filter's own false positive estimate once inserts
/// are done.
pub fn run_trial<F, E>(
    filter: &mut F,
    trial: usize,
    sample_size: u64,
    offset: u64,
    metrics: &dyn MetricsRecorder,
    estimate: E,
) -> TrialResult
where
    F: MembershipFilter,
    E: Fn(&F) -> f64,
{
    let mut inserted_new = 0u64;
    for key in offset..offset + sample_size {
        let start = Instant::now();
        let new = filter.insert(&key);
        metrics.record_insert(start.elapsed(), new);
        if new {
            inserted_new += 1;
        }
    }

    let mut false_positives = 0u64;
    for key in offset + sample_size..offset + 2 * sample_size {
        let start = Instant::now();
        let found = filter.includes(&key);
        metrics.record_lookup(start.elapsed(), found);
        if found {
            false_positives += 1;
        }
    }

    let result = TrialResult {
        trial,
        first_key: offset,
        inserted_new,
        count: filter.count(),
        false_positives,
        observed_rate: false_positives as f64 / sample_size as f64,
        estimated_rate: estimate(filter),
    };

    tracing::debug!(
        trial,
        inserted_new,
        false_positives,
        observed_rate = result.observed_rate,
        "Calibration trial finished"
    );
    result
}

/// Run `trials` trials, each on a fresh filter from `make_filter`, over
/// disjoint key ranges.
///
/// `on_trial_end` sees every trial's filter once its probes are done.
pub fn run_trials<F, M, E, T>(
    sample_size: u64,
    trials: usize,
    metrics: &dyn MetricsRecorder,
    mut make_filter: M,
    estimate: E,
    mut on_trial_end: T,
) -> Result<(Vec<TrialResult>, F), HarnessError>
where
    F: MembershipFilter,
    M: FnMut() -> F,
    E: Fn(&F) -> f64,
    T: FnMut(&F),
{
    if sample_size == 0 {
        return Err(HarnessError::EmptySample);
    }
    if trials == 0 {
        return Err(HarnessError::NoTrials);
    }
    let stride = sample_size
        .checked_mul(2)
        .filter(|stride| stride.checked_mul(trials as u64).is_some())
        .ok_or(HarnessError::KeyRangeOverflow {
            sample_size,
            trials,
        })?;

    let mut results = Vec::with_capacity(trials);
    let mut last = make_filter();
    for trial in 0..trials {
        if trial > 0 {
            last = make_filter();
        }
        let offset = stride * trial as u64;
        results.push(run_trial(
            &mut last,
            trial,
            sample_size,
            offset,
            metrics,
            &estimate,
        ));
        on_trial_end(&last);
    }

    Ok((results, last))
}
