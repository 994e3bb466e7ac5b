//! Tagged union over the filter kinds
//!
//! Lets callers pick the kind at runtime (e.g. from configuration) while the
//! merge path still checks the `FilterKind` discriminator before comparing
//! layouts.

use std::fmt;
use std::hash::Hash;

use super::bloom_filter::FixedFilter;
use super::config::FilterConfig;
use super::hash_functions::{HashPrimitive, Murmur3Hash};
use super::scalable::ScalableFilter;
use crate::error::FilterError;
use crate::ports::{FilterKind, MembershipFilter};

/// Either a fixed or a scalable filter
#[derive(Clone, Debug)]
pub enum AnyFilter<H: HashPrimitive = Murmur3Hash> {
    Fixed(FixedFilter<H>),
    Scalable(ScalableFilter<H>),
}

impl AnyFilter<Murmur3Hash> {
    /// Build the kind named by `config.kind`
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        Self::from_config_with_hasher(config, Murmur3Hash::default())
    }
}

impl<H: HashPrimitive> AnyFilter<H> {
    /// Build the kind named by `config.kind` with an injected hash primitive
    pub fn from_config_with_hasher(config: &FilterConfig, hasher: H) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(match config.kind {
            FilterKind::Fixed => AnyFilter::Fixed(FixedFilter::with_hasher(
                config.capacity,
                config.failure_rate,
                hasher,
            )),
            FilterKind::Scalable => AnyFilter::Scalable(ScalableFilter::with_hasher(
                config.capacity,
                config.failure_rate,
                hasher,
            )),
        })
    }

    /// Configured failure rate (base rate for a scalable chain)
    pub fn failure_rate(&self) -> f64 {
        match self {
            AnyFilter::Fixed(filter) => filter.failure_rate(),
            AnyFilter::Scalable(filter) => filter.base_failure_rate(),
        }
    }

    /// Estimated false positive rate given the current contents
    pub fn false_positive_rate(&self) -> f64 {
        match self {
            AnyFilter::Fixed(filter) => filter.false_positive_rate(),
            AnyFilter::Scalable(filter) => filter.false_positive_rate(),
        }
    }

    pub fn as_fixed(&self) -> Option<&FixedFilter<H>> {
        match self {
            AnyFilter::Fixed(filter) => Some(filter),
            AnyFilter::Scalable(_) => None,
        }
    }

    pub fn as_scalable(&self) -> Option<&ScalableFilter<H>> {
        match self {
            AnyFilter::Scalable(filter) => Some(filter),
            AnyFilter::Fixed(_) => None,
        }
    }
}

impl<H: HashPrimitive> From<FixedFilter<H>> for AnyFilter<H> {
    fn from(filter: FixedFilter<H>) -> Self {
        AnyFilter::Fixed(filter)
    }
}

impl<H: HashPrimitive> From<ScalableFilter<H>> for AnyFilter<H> {
    fn from(filter: ScalableFilter<H>) -> Self {
        AnyFilter::Scalable(filter)
    }
}

impl<H: HashPrimitive> MembershipFilter for AnyFilter<H> {
    fn kind(&self) -> FilterKind {
        match self {
            AnyFilter::Fixed(_) => FilterKind::Fixed,
            AnyFilter::Scalable(_) => FilterKind::Scalable,
        }
    }

    fn insert<K: Hash + ?Sized>(&mut self, key: &K) -> bool {
        match self {
            AnyFilter::Fixed(filter) => filter.insert(key),
            AnyFilter::Scalable(filter) => filter.insert(key),
        }
    }

    fn includes<K: Hash + ?Sized>(&self, key: &K) -> bool {
        match self {
            AnyFilter::Fixed(filter) => filter.includes(key),
            AnyFilter::Scalable(filter) => filter.includes(key),
        }
    }

    /// Merge filters of the same kind; mixing kinds is a `TypeMismatch`
    fn merge(&mut self, other: &Self) -> Result<(), FilterError> {
        let expected = self.kind();
        match (self, other) {
            (AnyFilter::Fixed(this), AnyFilter::Fixed(that)) => this.merge(that),
            (AnyFilter::Scalable(this), AnyFilter::Scalable(that)) => this.merge(that),
            (_, that) => Err(FilterError::TypeMismatch {
                expected,
                found: that.kind(),
            }),
        }
    }

    fn count(&self) -> usize {
        match self {
            AnyFilter::Fixed(filter) => filter.count(),
            AnyFilter::Scalable(filter) => filter.count(),
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<H: HashPrimitive> fmt::Display for AnyFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyFilter::Fixed(filter) => fmt::Display::fmt(filter, f),
            AnyFilter::Scalable(filter) => fmt::Display::fmt(filter, f),
        }
    }
}
