//! Inbound Ports (Driving Ports)
//!
//! The capability set shared by every filter kind. Callers can be written
//! against `MembershipFilter` and use fixed or scalable filters
//! interchangeably.

use std::fmt;
use std::hash::Hash;

use crate::error::FilterError;

/// Discriminator for the concrete filter kind
///
/// Merges are only defined between filters of the same kind; the
/// discriminator is checked before any structural comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// A single bit vector of fixed capacity
    Fixed,
    /// A growing chain of fixed filters
    Scalable,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Fixed => write!(f, "fixed"),
            FilterKind::Scalable => write!(f, "scalable"),
        }
    }
}

/// Approximate set membership (Driving Port)
///
/// Guarantees:
/// - No false negatives: after `insert(k)`, `includes(k)` returns true
/// - `merge` is an in-place union and leaves both operands untouched on error
pub trait MembershipFilter {
    /// Which kind of filter this is
    fn kind(&self) -> FilterKind;

    /// Insert a key, returning `true` if it looked new
    fn insert<K: Hash + ?Sized>(&mut self, key: &K) -> bool;

    /// Test whether a key might have been inserted
    fn includes<K: Hash + ?Sized>(&self, key: &K) -> bool;

    /// Union `other` into `self`
    fn merge(&mut self, other: &Self) -> Result<(), FilterError>;

    /// Estimated number of distinct keys inserted
    fn count(&self) -> usize;

    /// Human-readable counters snapshot
    fn describe(&self) -> String;
}
