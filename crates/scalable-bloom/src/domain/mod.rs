//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Parameter derivation
//! - Hash primitives and seeded index derivation
//! - Fixed-size Bloom filter
//! - Scalable Bloom filter (chain of fixed filters)
//! - Tagged union over both kinds
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - No internal locking; callers synchronise shared filters

pub mod any_filter;
pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub mod parameters;
pub mod scalable;

pub use any_filter::AnyFilter;
pub use bloom_filter::FixedFilter;
pub use config::{FilterConfig, FilterConfigBuilder};
pub use hash_functions::{HashPrimitive, Murmur3Hash, SipHash13};
pub use parameters::{
    calculate_fpr, calculate_optimal_parameters, required_bits, required_hashes, FilterParams,
    ERROR_TIGHTENING_RATIO,
};
pub use scalable::{ScalableFilter, SIZE_SCALE_FACTOR};
