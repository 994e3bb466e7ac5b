//! Metrics hooks for filter operations
//!
//! Filters themselves carry no instrumentation. Callers that drive filters
//! (the calibration tool, services embedding a filter) record through a
//! `MetricsRecorder` so the cost is opt-in.
//!
//! ## Usage
//!
//! ```
//! use scalable_bloom::{FixedFilter, Metrics};
//! use std::time::Instant;
//!
//! let metrics = Metrics::new();
//! let filter = FixedFilter::new(100, 0.01);
//! metrics.record_filter_created(filter.num_bits(), filter.hash_count(), filter.capacity());
//!
//! let start = Instant::now();
//! let found = filter.includes(&42u64);
//! metrics.record_lookup(start.elapsed(), found);
//! assert_eq!(metrics.snapshot().lookups_performed, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for filter operations
///
/// Relaxed atomic counters, shareable by reference.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total filters (or chain members) created
    pub filters_created: AtomicU64,
    /// Total insert calls
    pub inserts_performed: AtomicU64,
    /// Insert calls that set at least one new bit
    pub inserts_new: AtomicU64,
    /// Total lookups performed
    pub lookups_performed: AtomicU64,
    /// Lookups that returned true (true or false positives)
    pub lookups_positive: AtomicU64,
    /// Successful merges
    pub filters_merged: AtomicU64,
    /// Rejected merges
    pub merges_rejected: AtomicU64,
    /// Members appended to scalable chains
    pub chain_growths: AtomicU64,
    /// Total bytes allocated for bit vectors
    pub bytes_allocated: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record filter creation
    ///
    /// # Arguments
    /// * `num_bits` - Filter size in bits
    /// * `hash_count` - Index rounds (k)
    /// * `capacity` - Configured capacity
    pub fn record_filter_created(&self, num_bits: usize, _hash_count: usize, _capacity: usize) {
        self.filters_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(num_bits.div_ceil(8) as u64, Ordering::Relaxed);
    }

    /// Record an insert and whether it looked new
    pub fn record_insert(&self, duration: Duration, new: bool) {
        self.inserts_performed.fetch_add(1, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if new {
            self.inserts_new.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a lookup and whether it reported the key present
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a merge attempt
    pub fn record_merge(&self, accepted: bool) {
        if accepted {
            self.filters_merged.fetch_add(1, Ordering::Relaxed);
        } else {
            self.merges_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a scalable chain appending a member of `num_bits` bits
    pub fn record_growth(&self, num_bits: usize) {
        self.chain_growths.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(num_bits.div_ceil(8) as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            inserts_performed: self.inserts_performed.load(Ordering::Relaxed),
            inserts_new: self.inserts_new.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            filters_merged: self.filters_merged.load(Ordering::Relaxed),
            merges_rejected: self.merges_rejected.load(Ordering::Relaxed),
            chain_growths: self.chain_growths.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            avg_lookup_ns: self.avg_lookup_time_ns(),
            avg_insert_ns: self.avg_insert_time_ns(),
        }
    }

    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups_performed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    pub fn avg_insert_time_ns(&self) -> u64 {
        let total = self.insert_time_ns.load(Ordering::Relaxed);
        let count = self.inserts_performed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of positive lookups to total lookups
    ///
    /// When every probed key is a known non-member this is the observed
    /// false positive rate.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.filters_created,
            &self.inserts_performed,
            &self.inserts_new,
            &self.lookups_performed,
            &self.lookups_positive,
            &self.filters_merged,
            &self.merges_rejected,
            &self.chain_growths,
            &self.bytes_allocated,
            &self.lookup_time_ns,
            &self.insert_time_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub inserts_performed: u64,
    pub inserts_new: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub filters_merged: u64,
    pub merges_rejected: u64,
    pub chain_growths: u64,
    pub bytes_allocated: u64,
    pub avg_lookup_ns: u64,
    pub avg_insert_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this to forward filter events to an external metrics system.
pub trait MetricsRecorder: Send + Sync {
    fn record_filter_created(&self, num_bits: usize, hash_count: usize, capacity: usize);

    fn record_insert(&self, duration: Duration, new: bool);

    fn record_lookup(&self, duration: Duration, found: bool);

    fn record_merge(&self, accepted: bool);

    fn record_growth(&self, num_bits: usize);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_created(&self, _: usize, _: usize, _: usize) {}
    fn record_insert(&self, _: Duration, _: bool) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_merge(&self, _: bool) {}
    fn record_growth(&self, _: usize) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_created(&self, num_bits: usize, hash_count: usize, capacity: usize) {
        Metrics::record_filter_created(self, num_bits, hash_count, capacity);
    }

    fn record_insert(&self, duration: Duration, new: bool) {
        Metrics::record_insert(self, duration, new);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        Metrics::record_lookup(self, duration, found);
    }

    fn record_merge(&self, accepted: bool) {
        Metrics::record_merge(self, accepted);
    }

    fn record_growth(&self, num_bits: usize) {
        Metrics::record_growth(self, num_bits);
    }
}
