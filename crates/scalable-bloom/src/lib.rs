//! # Scalable Bloom
//!
//! Probabilistic set membership: a fixed-size Bloom filter and a scalable
//! chain of such filters that grows as keys arrive.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `FixedFilter`: bit vector sized from capacity and failure rate
//!   - `ScalableFilter`: chain of `FixedFilter`s with growing capacity
//!   - `AnyFilter`: tagged union selecting the kind at runtime
//!   - `FilterConfig` / `FilterConfigBuilder`: validated configuration
//!   - `HashPrimitive`: injected 32-bit hash (`Murmur3Hash`, `SipHash13`)
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MembershipFilter`: capability set shared by every kind
//!
//! - **Metrics** (`metrics`): opt-in counters for callers driving filters
//!
//! ## Invariants
//!
//! - No false negatives: if inserted, `includes()` MUST return true
//! - Expected FPR = (1 - e^(-kn/m))^k approaches the configured failure rate
//!   at capacity
//! - A scalable chain's overall failure rate stays below its base rate
//!
//! ## Usage Example
//!
//! ```
//! use scalable_bloom::{FixedFilter, ScalableFilter};
//!
//! let mut filter = FixedFilter::new(100, 0.01);
//! assert!(filter.insert("0xABCD"));
//! assert!(filter.includes("0xABCD"));
//!
//! let mut chain = ScalableFilter::new(10, 0.01);
//! for key in 0..100u64 {
//!     chain.insert(&key);
//! }
//! assert!(chain.len() > 1);
//! assert!(chain.includes(&42u64));
//! ```
//!
//! Filters are plain values without internal locking. Share them behind a
//! `Mutex` or `RwLock` when several threads need access.

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-exports for convenience
pub use domain::{
    AnyFilter, FilterConfig, FilterConfigBuilder, FixedFilter, HashPrimitive, Murmur3Hash,
    ScalableFilter, SipHash13,
};
pub use error::FilterError;
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{FilterKind, MembershipFilter};
