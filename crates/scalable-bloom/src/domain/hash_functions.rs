//! Hash primitives and seeded index derivation
//!
//! A filter reuses one 32-bit primitive with `k` deterministic seeds to
//! synthesise `k` index functions:
//!
//! ```text
//! seed_i  = hash(i)
//! index_i = hash(seed_i XOR hash(digest(key))) mod m
//! ```
//!
//! Seeds depend only on `k` and the primitive, so two filters built with the
//! same parameters derive identical indices and can be merged.

use std::hash::{Hash, Hasher};
use std::io::Cursor;

use siphasher::sip::SipHasher13;

/// Deterministic, non-cryptographic hash from an integer to 32 bits
///
/// Implementations must be pure: the same input always yields the same
/// output, across calls, filters and processes.
pub trait HashPrimitive: Clone + PartialEq + std::fmt::Debug {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Hash a single integer
    fn hash(&self, value: u64) -> u32;
}

/// MurmurHash3 (x86, 32-bit) over the little-endian bytes of the input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3Hash {
    seed: u32,
}

impl Murmur3Hash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-zero murmur seed. Filters built with different seeds are
    /// not mergeable.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl HashPrimitive for Murmur3Hash {
    fn name(&self) -> &'static str {
        "murmur3"
    }

    fn hash(&self, value: u64) -> u32 {
        let bytes = value.to_le_bytes();
        let mut cursor = Cursor::new(&bytes[..]);
        // Reading from an in-memory buffer cannot fail
        murmur3::murmur3_32(&mut cursor, self.seed).unwrap_or(0)
    }
}

/// SipHash-1-3 with fixed keys, folded to 32 bits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SipHash13 {
    k0: u64,
    k1: u64,
}

impl SipHash13 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl HashPrimitive for SipHash13 {
    fn name(&self) -> &'static str {
        "siphash13"
    }

    fn hash(&self, value: u64) -> u32 {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        hasher.write(&value.to_le_bytes());
        let h = hasher.finish();
        (h ^ (h >> 32)) as u32
    }
}

/// Digest an arbitrary key to 64 bits
///
/// Uses fixed SipHash keys instead of `RandomState` so digests are stable
/// across processes.
pub fn key_digest<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Derive the `k` per-round seeds: `seed_i = hash(i)`
pub fn derive_seeds<H: HashPrimitive>(hasher: &H, k: usize) -> Vec<u32> {
    (0..k as u64).map(|i| hasher.hash(i)).collect()
}

/// Compute the bit positions probed for `key`, one per seed
pub fn compute_hash_positions<H, K>(hasher: &H, seeds: &[u32], m: usize, key: &K) -> Vec<usize>
where
    H: HashPrimitive,
    K: Hash + ?Sized,
{
    let base = hasher.hash(key_digest(key));
    seeds
        .iter()
        .map(|&seed| index_for(hasher, seed, base, m))
        .collect()
}

#[inline]
pub(crate) fn index_for<H: HashPrimitive>(hasher: &H, seed: u32, base: u32, m: usize) -> usize {
    (hasher.hash(u64::from(seed ^ base)) as u64 % m as u64) as usize
}
