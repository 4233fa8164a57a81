//! Error types for set algebra.
//!
//! Every variant signals an internal-consistency problem (mixed families,
//! misaligned input, a set that is not canonical). Expected data variability
//! never reaches this layer.

use splitroute_types::{IpFamily, ParseError};
use thiserror::Error;

/// Result type alias for set operations.
pub type SetResult<T> = Result<T, SetError>;

/// Errors that can occur while building or combining address sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    /// Operands belong to different address families.
    #[error("address family mismatch: expected {expected}, found {found}")]
    FamilyMismatch {
        /// Family of the receiving set.
        expected: IpFamily,
        /// Family of the offending operand.
        found: IpFamily,
    },

    /// An input block has host bits set below its prefix length.
    #[error("range start is not aligned to its prefix length: {cidr}")]
    InvalidRange {
        /// The offending block as written.
        cidr: String,
    },

    /// An input literal is not an address or prefix at all.
    #[error("invalid CIDR literal: {0}")]
    Parse(ParseError),

    /// A range list claimed to be canonical is not.
    #[error("range list is not canonical: {reason}")]
    NotCanonical {
        /// Where the first violation was found.
        reason: String,
    },
}

impl SetError {
    /// Creates a family mismatch error.
    pub fn family_mismatch(expected: IpFamily, found: IpFamily) -> Self {
        Self::FamilyMismatch { expected, found }
    }

    /// Creates a not-canonical error.
    pub fn not_canonical(reason: impl Into<String>) -> Self {
        Self::NotCanonical {
            reason: reason.into(),
        }
    }
}

impl From<ParseError> for SetError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MisalignedPrefix(cidr) => SetError::InvalidRange { cidr },
            other => SetError::Parse(other),
        }
    }
}
