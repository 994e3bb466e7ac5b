//! Error types for the Bloom filter crate

use thiserror::Error;

use crate::ports::FilterKind;

/// Errors that can occur when configuring or combining filters
///
/// Saturation, hash collisions and false positives are expected probabilistic
/// behaviour and never surface as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The operands of a merge do not share the same bit layout
    #[error("Incompatible filter: {reason}")]
    IncompatibleFilter { reason: String },

    /// The operands of a merge are different kinds of filter
    #[error("Type mismatch: cannot merge a {found} filter into a {expected} filter")]
    TypeMismatch {
        expected: FilterKind,
        found: FilterKind,
    },

    #[error("Invalid capacity: {capacity} (must be at least 1)")]
    InvalidCapacity { capacity: usize },

    #[error("Invalid failure rate: {rate} (must be strictly between 0 and 1)")]
    InvalidFailureRate { rate: f64 },
}

impl FilterError {
    pub(crate) fn incompatible(reason: impl Into<String>) -> Self {
        FilterError::IncompatibleFilter {
            reason: reason.into(),
        }
    }
}
