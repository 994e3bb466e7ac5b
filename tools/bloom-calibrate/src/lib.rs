//! Bloom-Calibrate: empirical false positive measurement
//!
//! Drives the public `scalable-bloom` API from the outside: insert `n` keys,
//! probe `n` known non-members, and compare the observed false positive rate
//! with the configured failure rate.
//!
//! ```text
//! keys 0 .. n       -> insert
//! keys n .. 2n      -> includes? (every hit is a false positive)
//! observed = hits / n   vs   failure_rate
//! ```

pub mod harness;
pub mod report;

pub use harness::{run_trial, run_trials, HarnessError, TrialResult};
pub use report::CalibrationReport;

use scalable_bloom::{
    AnyFilter, FilterConfig, FilterError, HashPrimitive, MembershipFilter, MetricsRecorder,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalibrateError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

/// What to measure
#[derive(Clone, Debug)]
pub struct CalibrationSettings {
    pub config: FilterConfig,
    pub sample_size: u64,
    pub trials: usize,
}

/// Run a full calibration with the given hash primitive.
pub fn calibrate<H: HashPrimitive>(
    settings: &CalibrationSettings,
    hasher: H,
    metrics: &dyn MetricsRecorder,
) -> Result<CalibrationReport, CalibrateError> {
    let _span = bloom_telemetry::filter_span!(
        "calibrate",
        kind = %settings.config.kind,
        hasher = hasher.name(),
        sample_size = settings.sample_size,
        trials = settings.trials
    )
    .entered();

    let hasher_name = hasher.name();
    let template = AnyFilter::from_config_with_hasher(&settings.config, hasher)?;

    let (trials, last) = run_trials(
        settings.sample_size,
        settings.trials,
        metrics,
        || {
            record_created(&template, metrics);
            template.clone()
        },
        AnyFilter::false_positive_rate,
        |filter| record_growth(filter, metrics),
    )?;

    let report = CalibrationReport::new(
        settings.config.kind.to_string(),
        hasher_name,
        settings.config.capacity,
        settings.config.failure_rate,
        settings.sample_size,
        trials,
        last.describe(),
    );

    tracing::info!(
        mean_observed_rate = report.mean_observed_rate,
        failure_rate = report.failure_rate,
        ratio = report.ratio_to_target,
        "Calibration finished"
    );
    Ok(report)
}

fn record_created<H: HashPrimitive>(filter: &AnyFilter<H>, metrics: &dyn MetricsRecorder) {
    match filter {
        AnyFilter::Fixed(f) => {
            metrics.record_filter_created(f.num_bits(), f.hash_count(), f.capacity())
        }
        AnyFilter::Scalable(chain) => {
            let active = chain.active();
            metrics.record_filter_created(active.num_bits(), active.hash_count(), active.capacity())
        }
    }
}

/// Members beyond the first were appended while the trial ran
fn record_growth<H: HashPrimitive>(filter: &AnyFilter<H>, metrics: &dyn MetricsRecorder) {
    if let Some(chain) = filter.as_scalable() {
        for member in chain.members().skip(1) {
            metrics.record_growth(member.num_bits());
        }
    }
}
