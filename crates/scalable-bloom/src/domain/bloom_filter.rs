//! Fixed-size Bloom filter
//!
//! INVARIANTS:
//! - `bits.len() == num_bits`
//! - `bits_flipped <= num_bits`
//! - No false negatives: if inserted (and not cleared since), `includes()` MUST return true
//! - `seeds` never change after construction

use std::fmt;
use std::hash::Hash;

use bitvec::prelude::*;

use super::config::FilterConfig;
use super::hash_functions::{derive_seeds, index_for, key_digest, HashPrimitive, Murmur3Hash};
use super::parameters::{calculate_fpr, required_bits, required_hashes};
use crate::error::FilterError;
use crate::ports::{FilterKind, MembershipFilter};

/// Bloom filter with a fixed capacity and target failure rate
///
/// The bit layout (`num_bits`, `hash_count`, seeds) is derived once from
/// `capacity` and `failure_rate` and never changes, which is what makes two
/// filters built with the same parameters mergeable.
#[derive(Clone, Debug)]
pub struct FixedFilter<H: HashPrimitive = Murmur3Hash> {
    /// Packed bit array storing the filter state
    bits: BitVec<u8, Lsb0>,
    /// Insertions the failure rate is calibrated for
    capacity: usize,
    /// Target false positive rate at capacity
    failure_rate: f64,
    /// Size in bits (m)
    num_bits: usize,
    /// Index rounds per operation (k)
    hash_count: usize,
    /// Insertions that set at least one new bit
    count: usize,
    /// Cumulative false -> true bit transitions
    bits_flipped: usize,
    /// One seed per round, `seed[i] = hash(i)`
    seeds: Vec<u32>,
    hasher: H,
}

impl FixedFilter<Murmur3Hash> {
    /// Create a filter for `capacity` keys at `failure_rate` using MurmurHash3
    ///
    /// # Arguments
    /// * `capacity` - Expected number of unique insertions (n)
    /// * `failure_rate` - Target false positive rate at capacity
    pub fn new(capacity: usize, failure_rate: f64) -> Self {
        Self::with_hasher(capacity, failure_rate, Murmur3Hash::default())
    }

    /// Create a filter from a validated configuration
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self::new(config.capacity, config.failure_rate))
    }
}

impl<H: HashPrimitive> FixedFilter<H> {
    /// Create a filter using an injected hash primitive
    ///
    /// A capacity of 0 is stored as 1.
    pub fn with_hasher(capacity: usize, failure_rate: f64, hasher: H) -> Self {
        let capacity = capacity.max(1);
        let num_bits = required_bits(capacity, failure_rate);
        let hash_count = required_hashes(capacity, num_bits);
        let seeds = derive_seeds(&hasher, hash_count);

        Self {
            bits: bitvec![u8, Lsb0; 0; num_bits],
            capacity,
            failure_rate,
            num_bits,
            hash_count,
            count: 0,
            bits_flipped: 0,
            seeds,
            hasher,
        }
    }

    /// Insert a key
    ///
    /// Returns `true` if at least one bit was newly set, i.e. the key was not
    /// seen before. `false` means every probed bit was already set, which is
    /// strong but not conclusive evidence of a prior insert.
    pub fn insert<K: Hash + ?Sized>(&mut self, key: &K) -> bool {
        let base = self.hasher.hash(key_digest(key));
        let mut flipped = false;

        for &seed in &self.seeds {
            let pos = index_for(&self.hasher, seed, base, self.num_bits);
            if !self.bits[pos] {
                self.bits.set(pos, true);
                self.bits_flipped += 1;
                flipped = true;
            }
        }

        if flipped {
            self.count += 1;
        }
        flipped
    }

    /// Test whether a key might have been inserted
    ///
    /// Returns:
    /// - `true` if the key might be in the set (could be a false positive)
    /// - `false` if the key is definitely NOT in the set (never a false negative)
    pub fn includes<K: Hash + ?Sized>(&self, key: &K) -> bool {
        let base = self.hasher.hash(key_digest(key));
        self.seeds
            .iter()
            .all(|&seed| self.bits[index_for(&self.hasher, seed, base, self.num_bits)])
    }

    /// Reset every bit along with `count` and `bits_flipped`
    pub fn clear(&mut self) {
        self.bits.fill(false);
        self.count = 0;
        self.bits_flipped = 0;
    }

    /// Merge another filter into this one (OR operation)
    ///
    /// Both filters must share `num_bits`, `hash_count` and seeds. On error
    /// neither filter is modified.
    ///
    /// After a merge `count` is the sum of both counts (an upper bound on the
    /// distinct keys) and `bits_flipped` is the number of set bits.
    pub fn merge(&mut self, other: &FixedFilter<H>) -> Result<(), FilterError> {
        self.check_compatible(other)?;

        let self_raw = self.bits.as_raw_mut_slice();
        let other_raw = other.bits.as_raw_slice();
        for (s, o) in self_raw.iter_mut().zip(other_raw.iter()) {
            *s |= *o;
        }

        self.count = self.count.saturating_add(other.count);
        self.bits_flipped = self.bits.count_ones();
        Ok(())
    }

    /// Check whether `other` shares this filter's bit layout
    pub fn check_compatible(&self, other: &FixedFilter<H>) -> Result<(), FilterError> {
        if self.num_bits != other.num_bits {
            return Err(FilterError::incompatible(format!(
                "num_bits differ: {} vs {}",
                self.num_bits, other.num_bits
            )));
        }
        if self.hash_count != other.hash_count {
            return Err(FilterError::incompatible(format!(
                "hash_count differs: {} vs {}",
                self.hash_count, other.hash_count
            )));
        }
        if self.seeds != other.seeds {
            return Err(FilterError::incompatible(
                "seed derivation differs (different hash primitive configuration)",
            ));
        }
        Ok(())
    }

    /// Estimated false positive rate given the current `count`
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn false_positive_rate(&self) -> f64 {
        calculate_fpr(self.num_bits, self.count, self.hash_count)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn hash_count(&self) -> usize {
        self.hash_count
    }

    /// Number of insertions that set at least one new bit
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bits_flipped(&self) -> usize {
        self.bits_flipped
    }

    /// Number of bits currently set
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of bits currently set
    pub fn fill_ratio(&self) -> f64 {
        self.bits_set() as f64 / self.num_bits as f64
    }

    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// `true` once more keys were inserted than the filter was sized for
    pub fn is_saturated(&self) -> bool {
        self.count > self.capacity
    }

    /// Human-readable counters snapshot
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<H: HashPrimitive> fmt::Display for FixedFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedFilter(capacity={}, failure_rate={}, num_bits={}, hash_count={}, count={}, bits_flipped={}, hasher={})",
            self.capacity,
            self.failure_rate,
            self.num_bits,
            self.hash_count,
            self.count,
            self.bits_flipped,
            self.hasher.name()
        )
    }
}

impl<H: HashPrimitive> MembershipFilter for FixedFilter<H> {
    fn kind(&self) -> FilterKind {
        FilterKind::Fixed
    }

    fn insert<K: Hash + ?Sized>(&mut self, key: &K) -> bool {
        FixedFilter::insert(self, key)
    }

    fn includes<K: Hash + ?Sized>(&self, key: &K) -> bool {
        FixedFilter::includes(self, key)
    }

    fn merge(&mut self, other: &Self) -> Result<(), FilterError> {
        FixedFilter::merge(self, other)
    }

    fn count(&self) -> usize {
        self.count
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}
