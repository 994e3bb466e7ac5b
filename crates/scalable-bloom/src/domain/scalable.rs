//! Scalable Bloom filter
//!
//! A chain of fixed filters. New keys go to the newest (active) member; when
//! it holds more keys than its capacity a new member is appended with
//! `SIZE_SCALE_FACTOR` times the capacity and a failure rate tightened by
//! `ERROR_TIGHTENING_RATIO`. Queries OR over every member.
//!
//! INVARIANTS:
//! - There is always exactly one active member
//! - Member `i` of an unmerged chain has capacity `initial * 2^i` and failure
//!   rate `base * r^(i+1)`, so the chain's overall rate stays below `base`
//! - No false negatives across the whole chain

use std::fmt;
use std::hash::Hash;

use tracing::debug;

use super::bloom_filter::FixedFilter;
use super::config::FilterConfig;
use super::hash_functions::{HashPrimitive, Murmur3Hash};
use super::parameters::member_failure_rate;
use crate::error::FilterError;
use crate::ports::{FilterKind, MembershipFilter};

/// Capacity multiplier between consecutive members
pub const SIZE_SCALE_FACTOR: usize = 2;

/// Bloom filter without a fixed capacity
#[derive(Clone, Debug)]
pub struct ScalableFilter<H: HashPrimitive = Murmur3Hash> {
    /// Target failure rate for the whole chain
    base_failure_rate: f64,
    /// Capacity of the first member created by this chain
    initial_capacity: usize,
    /// Full members, oldest first
    sealed: Vec<FixedFilter<H>>,
    /// Member receiving new insertions
    active: FixedFilter<H>,
}

impl ScalableFilter<Murmur3Hash> {
    /// Create a chain whose first member holds `initial_capacity` keys
    pub fn new(initial_capacity: usize, base_failure_rate: f64) -> Self {
        Self::with_hasher(initial_capacity, base_failure_rate, Murmur3Hash::default())
    }

    /// Create a chain from a validated configuration
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self::new(config.capacity, config.failure_rate))
    }
}

impl<H: HashPrimitive> ScalableFilter<H> {
    /// Create a chain using an injected hash primitive
    ///
    /// An `initial_capacity` of 0 is treated as 1.
    pub fn with_hasher(initial_capacity: usize, base_failure_rate: f64, hasher: H) -> Self {
        let initial_capacity = initial_capacity.max(1);
        let active = FixedFilter::with_hasher(
            initial_capacity,
            member_failure_rate(base_failure_rate, 0),
            hasher,
        );

        Self {
            base_failure_rate,
            initial_capacity,
            sealed: Vec::new(),
            active,
        }
    }

    /// Insert a key into the active member, growing the chain once it is full
    ///
    /// Returns the active member's answer: `true` if the key looked new.
    pub fn insert<K: Hash + ?Sized>(&mut self, key: &K) -> bool {
        let inserted = self.active.insert(key);
        if inserted && self.active.is_saturated() {
            self.grow();
        }
        inserted
    }

    /// Test whether any member might contain the key
    pub fn includes<K: Hash + ?Sized>(&self, key: &K) -> bool {
        self.members().any(|filter| filter.includes(key))
    }

    /// Union another chain into this one
    ///
    /// The other chain's members are prepended, oldest first, so this chain's
    /// active member keeps receiving inserts. Both chains must share the base
    /// failure rate and hash primitive; otherwise the merged chain could no
    /// longer honour its failure-rate bound and an `IncompatibleFilter` error
    /// is returned with neither chain modified.
    pub fn merge(&mut self, other: &ScalableFilter<H>) -> Result<(), FilterError> {
        if let Err(err) = self.check_compatible(other) {
            debug!(error = %err, "Rejected scalable filter merge");
            return Err(err);
        }

        let mut merged: Vec<FixedFilter<H>> = other.members().cloned().collect();
        merged.append(&mut self.sealed);
        self.sealed = merged;

        debug!(
            members = self.len(),
            count = self.count(),
            "Merged scalable filter chains"
        );
        Ok(())
    }

    /// Check whether `other` was configured like this chain
    pub fn check_compatible(&self, other: &ScalableFilter<H>) -> Result<(), FilterError> {
        if self.base_failure_rate.to_bits() != other.base_failure_rate.to_bits() {
            return Err(FilterError::incompatible(format!(
                "base failure rates differ: {} vs {}",
                self.base_failure_rate, other.base_failure_rate
            )));
        }
        if self.active.hasher() != other.active.hasher() {
            return Err(FilterError::incompatible(
                "chains use different hash primitive configurations",
            ));
        }
        Ok(())
    }

    fn grow(&mut self) {
        let capacity = self.active.capacity().saturating_mul(SIZE_SCALE_FACTOR);
        let failure_rate = member_failure_rate(self.base_failure_rate, self.len());
        let next = FixedFilter::with_hasher(capacity, failure_rate, self.active.hasher().clone());

        debug!(
            member = self.len(),
            capacity,
            failure_rate,
            num_bits = next.num_bits(),
            hash_count = next.hash_count(),
            "Scalable filter appending member"
        );

        let full = std::mem::replace(&mut self.active, next);
        self.sealed.push(full);
    }

    /// Members, oldest first; the last one is active
    pub fn members(&self) -> impl Iterator<Item = &FixedFilter<H>> + '_ {
        self.sealed.iter().chain(std::iter::once(&self.active))
    }

    /// The member currently receiving inserts
    pub fn active(&self) -> &FixedFilter<H> {
        &self.active
    }

    /// Number of member filters
    pub fn len(&self) -> usize {
        self.sealed.len() + 1
    }

    /// `true` if no member has any bit set
    pub fn is_empty(&self) -> bool {
        self.members().all(FixedFilter::is_empty)
    }

    /// Sum of member counts
    pub fn count(&self) -> usize {
        self.members().map(FixedFilter::count).sum()
    }

    pub fn base_failure_rate(&self) -> f64 {
        self.base_failure_rate
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Total memory footprint in bits across all members
    pub fn total_bits(&self) -> usize {
        self.members().map(FixedFilter::num_bits).sum()
    }

    /// Estimated false positive rate of the whole chain
    ///
    /// Formula: 1 - prod(1 - fpr_i)
    pub fn false_positive_rate(&self) -> f64 {
        1.0 - self
            .members()
            .map(|filter| 1.0 - filter.false_positive_rate())
            .product::<f64>()
    }

    /// Human-readable counters snapshot, one line per member
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<H: HashPrimitive> fmt::Display for ScalableFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScalableFilter(base_failure_rate={}, members={}, count={}, total_bits={})",
            self.base_failure_rate,
            self.len(),
            self.count(),
            self.total_bits()
        )?;
        for (index, member) in self.members().enumerate() {
            write!(f, "\n  [{}] {}", index, member)?;
        }
        Ok(())
    }
}

impl<H: HashPrimitive> MembershipFilter for ScalableFilter<H> {
    fn kind(&self) -> FilterKind {
        FilterKind::Scalable
    }

    fn insert<K: Hash + ?Sized>(&mut self, key: &K) -> bool {
        ScalableFilter::insert(self, key)
    }

    fn includes<K: Hash + ?Sized>(&self, key: &K) -> bool {
        ScalableFilter::includes(self, key)
    }

    fn merge(&mut self, other: &Self) -> Result<(), FilterError> {
        ScalableFilter::merge(self, other)
    }

    fn count(&self) -> usize {
        ScalableFilter::count(self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hash_functions::SipHash13;
    use crate::domain::parameters::ERROR_TIGHTENING_RATIO;
    use proptest::prelude::*;

    #[test]
    fn test_new_chain_has_single_member() {
        let filter = ScalableFilter::new(10, 0.01);

        assert_eq!(filter.len(), 1);
        assert_eq!(filter.count(), 0);
        assert!(filter.is_empty());
        assert_eq!(filter.active().capacity(), 10);
        assert!((filter.active().failure_rate() - 0.01 * ERROR_TIGHTENING_RATIO).abs() < 1e-15);
    }

    #[test]
    fn test_growth_after_capacity_exceeded() {
        let mut filter = ScalableFilter::new(10, 0.0001);

        for i in 0..11u64 {
            assert!(filter.insert(&i), "Distinct key {} should look new", i);
        }

        assert_eq!(filter.count(), 11);
        assert_eq!(filter.len(), 2, "11th key must append a second member");
        let capacities: Vec<usize> = filter.members().map(FixedFilter::capacity).collect();
        assert_eq!(capacities, vec![10, 20]);
        assert_eq!(filter.active().count(), 0, "New member starts empty");
    }

    #[test]
    fn test_no_growth_at_exact_capacity() {
        let mut filter = ScalableFilter::new(10, 0.0001);
        for i in 0..10u64 {
            filter.insert(&i);
        }
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_zero_capacity_chain_grows_geometrically() {
        let mut filter = ScalableFilter::new(0, 0.01);
        assert_eq!(filter.initial_capacity(), 1);

        for i in 0..100u64 {
            filter.insert(&i);
        }

        assert!(filter.len() < 10, "Chain grew to {} members", filter.len());
        let capacities: Vec<usize> = filter.members().map(FixedFilter::capacity).collect();
        for (index, capacity) in capacities.iter().enumerate() {
            assert_eq!(*capacity, 1 << index);
        }
        assert!((0..100u64).all(|i| filter.includes(&i)));
    }

    #[test]
    fn test_member_failure_rates_tighten() {
        let base = 0.01;
        let mut filter = ScalableFilter::new(4, base);
        for i in 0..500u64 {
            filter.insert(&i);
        }

        assert!(filter.len() >= 4, "Chain should have grown, got {}", filter.len());
        for (index, member) in filter.members().enumerate() {
            let expected = base * ERROR_TIGHTENING_RATIO.powi(index as i32 + 1);
            assert!((member.failure_rate() - expected).abs() < 1e-15);
            assert_eq!(member.capacity(), 4 << index);
        }
    }

    #[test]
    fn test_no_false_negatives_across_members() {
        let mut filter = ScalableFilter::new(16, 0.01);
        for i in 0..2000u64 {
            filter.insert(&i);
        }
        assert!(filter.len() > 1);
        for i in 0..2000u64 {
            assert!(filter.includes(&i), "False negative for {}", i);
        }
    }

    #[test]
    fn test_chain_false_positive_rate_bounded() {
        let base = 0.01;
        let mut filter = ScalableFilter::new(100, base);
        let n = 5000u64;
        for i in 0..n {
            filter.insert(&i);
        }

        let trials = 50_000u64;
        let false_positives = (n..n + trials).filter(|i| filter.includes(i)).count();
        let actual = false_positives as f64 / trials as f64;

        assert!(
            actual <= base * 1.5,
            "Chain FPR {} exceeds 1.5 * base {}",
            actual,
            base
        );
        assert!(filter.false_positive_rate() < base * 1.5);
    }

    #[test]
    fn test_repeated_insert_does_not_grow() {
        let mut filter = ScalableFilter::new(2, 0.01);
        for _ in 0..100 {
            filter.insert("same-key");
        }
        assert_eq!(filter.count(), 1);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_merge_prepends_other_members() {
        let mut left = ScalableFilter::new(10, 0.001);
        let mut right = ScalableFilter::new(10, 0.001);
        for i in 0..25u64 {
            left.insert(&i);
        }
        for i in 1000..1015u64 {
            right.insert(&i);
        }
        let left_len = left.len();
        let right_len = right.len();
        let left_active_capacity = left.active().capacity();
        let right_capacities: Vec<usize> = right.members().map(FixedFilter::capacity).collect();

        left.merge(&right).expect("Same configuration must merge");

        assert_eq!(left.len(), left_len + right_len);
        assert_eq!(left.count(), 25 + 15);
        let merged_prefix: Vec<usize> = left
            .members()
            .take(right_len)
            .map(FixedFilter::capacity)
            .collect();
        assert_eq!(merged_prefix, right_capacities, "Other chain comes first, oldest first");
        assert_eq!(left.active().capacity(), left_active_capacity, "Active member unchanged");

        for i in (0..25u64).chain(1000..1015) {
            assert!(left.includes(&i), "Merged chain lost {}", i);
        }
    }

    #[test]
    fn test_merge_rejects_different_base_rate() {
        let mut left = ScalableFilter::new(10, 0.01);
        let right = ScalableFilter::new(10, 0.02);
        left.insert(&1u64);

        let result = left.merge(&right);

        assert!(matches!(result, Err(FilterError::IncompatibleFilter { .. })));
        assert_eq!(left.len(), 1);
        assert_eq!(left.count(), 1);
    }

    #[test]
    fn test_merge_rejects_different_hasher() {
        let mut left = ScalableFilter::with_hasher(10, 0.01, Murmur3Hash::with_seed(9));
        let right = ScalableFilter::new(10, 0.01);

        assert!(matches!(
            left.merge(&right),
            Err(FilterError::IncompatibleFilter { .. })
        ));
    }

    #[test]
    fn test_growth_after_merge_uses_member_count() {
        let mut left = ScalableFilter::new(2, 0.01);
        let right = ScalableFilter::new(2, 0.01);
        left.merge(&right).unwrap();
        assert_eq!(left.len(), 2);

        for i in 0..3u64 {
            left.insert(&i);
        }

        assert_eq!(left.len(), 3);
        let expected = 0.01 * ERROR_TIGHTENING_RATIO.powi(3);
        assert!((left.active().failure_rate() - expected).abs() < 1e-15);
        assert_eq!(left.active().capacity(), 4);
    }

    #[test]
    fn test_injected_hasher_propagates_to_new_members() {
        let mut filter = ScalableFilter::with_hasher(4, 0.01, SipHash13::new());
        for i in 0..50u64 {
            filter.insert(&i);
        }
        assert!(filter.len() > 1);
        assert!(filter.members().all(|m| m.hasher() == &SipHash13::new()));
        assert!((0..50u64).all(|i| filter.includes(&i)));
    }

    #[test]
    fn test_describe_lists_members() {
        let mut filter = ScalableFilter::new(10, 0.0001);
        for i in 0..11u64 {
            filter.insert(&i);
        }
        let text = filter.describe();
        assert!(text.starts_with("ScalableFilter("));
        assert!(text.contains("members=2"));
        assert!(text.contains("[1] FixedFilter(capacity=20"));
    }

    proptest! {
        #[test]
        fn prop_no_false_negatives(keys in proptest::collection::vec(any::<u64>(), 0..400)) {
            let mut filter = ScalableFilter::new(8, 0.01);
            for key in &keys {
                filter.insert(key);
            }
            for key in &keys {
                prop_assert!(filter.includes(key));
            }
        }
    }
}
