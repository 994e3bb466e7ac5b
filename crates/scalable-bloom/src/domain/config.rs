//! Filter configuration and validation
//!
//! # Example
//!
//! ```
//! use scalable_bloom::{FilterConfigBuilder, FilterKind};
//!
//! let config = FilterConfigBuilder::new()
//!     .capacity(10_000)
//!     .failure_rate(0.001)
//!     .kind(FilterKind::Scalable)
//!     .build()
//!     .expect("Valid config");
//! assert_eq!(config.capacity, 10_000);
//! ```

use crate::error::FilterError;
use crate::ports::FilterKind;

/// Filter configuration
///
/// For a scalable chain `capacity` is the first member's capacity and
/// `failure_rate` the base rate of the whole chain.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterConfig {
    /// Expected unique insertions (initial capacity for a chain)
    pub capacity: usize,
    /// Target false positive rate, strictly between 0 and 1
    pub failure_rate: f64,
    /// Which filter kind to build
    pub kind: FilterKind,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            failure_rate: 0.01,
            kind: FilterKind::Scalable,
        }
    }
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(capacity: usize, failure_rate: f64, kind: FilterKind) -> Result<Self, FilterError> {
        let config = Self {
            capacity,
            failure_rate,
            kind,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.capacity == 0 {
            return Err(FilterError::InvalidCapacity {
                capacity: self.capacity,
            });
        }

        // Also rejects NaN
        if !(self.failure_rate > 0.0 && self.failure_rate < 1.0) {
            return Err(FilterError::InvalidFailureRate {
                rate: self.failure_rate,
            });
        }

        Ok(())
    }

    /// Builder-style method to set capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style method to set failure rate
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate;
        self
    }

    /// Builder-style method to set filter kind
    pub fn with_kind(mut self, kind: FilterKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    capacity: Option<usize>,
    failure_rate: Option<f64>,
    kind: Option<FilterKind>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = Some(rate);
        self
    }

    pub fn kind(mut self, kind: FilterKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> FilterConfig {
        let defaults = FilterConfig::default();

        FilterConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            failure_rate: self.failure_rate.unwrap_or(defaults.failure_rate),
            kind: self.kind.unwrap_or(defaults.kind),
        }
    }
}
