//! Calibration report rendering.

use std::fmt::Write as _;

use serde::Serialize;

use crate::harness::TrialResult;

/// Summary of a calibration run
#[derive(Clone, Debug, Serialize)]
pub struct CalibrationReport {
    pub kind: String,
    pub hasher: String,
    pub capacity: usize,
    pub failure_rate: f64,
    pub sample_size: u64,
    pub trials: Vec<TrialResult>,
    pub mean_observed_rate: f64,
    pub max_observed_rate: f64,
    /// `mean_observed_rate / failure_rate`
    pub ratio_to_target: f64,
    /// `describe()` of the last trial's filter
    pub final_filter: String,
}

impl CalibrationReport {
    pub fn new(
        kind: impl Into<String>,
        hasher: impl Into<String>,
        capacity: usize,
        failure_rate: f64,
        sample_size: u64,
        trials: Vec<TrialResult>,
        final_filter: String,
    ) -> Self {
        let rates: Vec<f64> = trials.iter().map(|t| t.observed_rate).collect();
        let mean_observed_rate = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };
        let max_observed_rate = rates.iter().copied().fold(0.0, f64::max);

        Self {
            kind: kind.into(),
            hasher: hasher.into(),
            capacity,
            failure_rate,
            sample_size,
            trials,
            mean_observed_rate,
            max_observed_rate,
            ratio_to_target: mean_observed_rate / failure_rate,
            final_filter,
        }
    }

    /// `true` when the mean observed rate stays within `max_ratio` times
    /// the configured failure rate
    pub fn within(&self, max_ratio: f64) -> bool {
        self.mean_observed_rate <= self.failure_rate * max_ratio
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text table
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "kind={} hasher={} capacity={} failure_rate={} sample_size={}",
            self.kind, self.hasher, self.capacity, self.failure_rate, self.sample_size
        );
        let _ = writeln!(
            out,
            "{:>5} {:>10} {:>10} {:>12} {:>12} {:>12}",
            "trial", "new", "count", "false_pos", "observed", "estimated"
        );
        for t in &self.trials {
            let _ = writeln!(
                out,
                "{:>5} {:>10} {:>10} {:>12} {:>12.6} {:>12.6}",
                t.trial, t.inserted_new, t.count, t.false_positives, t.observed_rate, t.estimated_rate
            );
        }
        let _ = writeln!(
            out,
            "mean observed {:.6} (max {:.6}) vs target {} -> ratio {:.3}",
            self.mean_observed_rate, self.max_observed_rate, self.failure_rate, self.ratio_to_target
        );
        let _ = write!(out, "{}", self.final_filter);
        out
    }
}
