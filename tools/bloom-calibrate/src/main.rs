//! Bloom-Calibrate: measure the empirical false positive rate of a filter
//!
//! Inserts `n` keys into a fresh filter, probes `n` known non-members and
//! prints the observed rate next to the configured failure rate.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use bloom_calibrate::{calibrate, CalibrationReport, CalibrationSettings};
use bloom_telemetry::{init_telemetry, TelemetryConfig};
use scalable_bloom::{FilterConfigBuilder, FilterKind, Metrics, Murmur3Hash, SipHash13};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Fixed,
    Scalable,
}

impl From<KindArg> for FilterKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Fixed => FilterKind::Fixed,
            KindArg::Scalable => FilterKind::Scalable,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HasherArg {
    Murmur3,
    Siphash13,
}

/// Bloom-Calibrate: empirical false positive rate of scalable-bloom filters
#[derive(Parser, Debug)]
#[command(name = "bloom-calibrate")]
#[command(about = "Measure the observed false positive rate of a Bloom filter")]
struct Args {
    /// Keys inserted (and non-members probed) per trial
    #[arg(short = 'n', long, default_value = "10000")]
    sample_size: u64,

    /// Filter capacity (initial member capacity for a scalable chain)
    #[arg(short, long, default_value = "10000")]
    capacity: usize,

    /// Target failure rate
    #[arg(short = 'p', long, default_value = "0.01")]
    failure_rate: f64,

    /// Filter kind
    #[arg(short, long, value_enum, default_value = "fixed")]
    kind: KindArg,

    /// Hash primitive used for index derivation
    #[arg(long, value_enum, default_value = "murmur3")]
    hasher: HasherArg,

    /// Independent trials over disjoint key ranges
    #[arg(short, long, default_value = "1")]
    trials: usize,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,

    /// Exit non-zero when the mean observed rate exceeds this multiple of the failure rate
    #[arg(long)]
    max_ratio: Option<f64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_telemetry(TelemetryConfig::from_env()).context("failed to initialise logging")?;

    let config = FilterConfigBuilder::new()
        .capacity(args.capacity)
        .failure_rate(args.failure_rate)
        .kind(args.kind.into())
        .build()
        .context("invalid filter configuration")?;

    let settings = CalibrationSettings {
        config,
        sample_size: args.sample_size,
        trials: args.trials,
    };

    let metrics = Metrics::new();
    let report = match args.hasher {
        HasherArg::Murmur3 => calibrate(&settings, Murmur3Hash::new(), &metrics),
        HasherArg::Siphash13 => calibrate(&settings, SipHash13::new(), &metrics),
    }
    .context("calibration failed")?;

    print_report(&report, args.json)?;

    let snapshot = metrics.snapshot();
    tracing::debug!(
        inserts = snapshot.inserts_performed,
        lookups = snapshot.lookups_performed,
        avg_insert_ns = snapshot.avg_insert_ns,
        avg_lookup_ns = snapshot.avg_lookup_ns,
        bytes_allocated = snapshot.bytes_allocated,
        "Calibration metrics"
    );

    if let Some(max_ratio) = args.max_ratio {
        if !report.within(max_ratio) {
            bail!(
                "observed rate {:.6} exceeds {} x failure rate {}",
                report.mean_observed_rate,
                max_ratio,
                report.failure_rate
            );
        }
    }

    Ok(())
}

fn print_report(report: &CalibrationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json().context("failed to encode report")?);
    } else {
        println!("{}", report.render_text());
    }
    Ok(())
}
