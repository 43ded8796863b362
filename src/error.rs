//! Unified error type for all storage operations.
//!
//! Overflow is never an error in this crate: it is absorbed by promoting the
//! buffer to a wider counter kind. What remains are programmer errors
//! (mismatched sizes), resource exhaustion while growing a buffer, and
//! malformed snapshots handed to [`Storage::from_snapshot`].
//!
//! # Example
//!
//! ```rust
//! use conteggi::{Storage, StorageError};
//!
//! let mut a = Storage::new(3);
//! let b = Storage::new(4);
//!
//! match a.merge(&b) {
//!     Err(StorageError::SizeMismatch { expected, found }) => {
//!         assert_eq!((expected, found), (3, 4));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! [`Storage::from_snapshot`]: crate::Storage::from_snapshot

use thiserror::Error;

use crate::storage::kind::CounterKind;

/// Error type for storage operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Two storages taking part in the same operation have different sizes.
    #[error("size mismatch: expected {expected} bins, found {found}")]
    SizeMismatch {
        /// Size of the storage the operation was called on.
        expected: usize,
        /// Size of the other operand.
        found: usize,
    },

    /// The allocator could not provide a buffer for the requested kind.
    #[error("cannot allocate {size} counters of kind {kind}")]
    Allocation {
        /// Kind of the buffer being allocated.
        kind: CounterKind,
        /// Number of elements requested.
        size: usize,
    },

    /// A counter value cannot be represented in the target kind.
    ///
    /// Promotion only ever widens, so storage operations do not return this;
    /// it guards the element conversion used while rebuilding a buffer.
    #[error("cannot convert counters of kind {from} to kind {to}")]
    Conversion {
        /// Kind of the source buffer.
        from: CounterKind,
        /// Kind of the target buffer.
        to: CounterKind,
    },

    /// A persisted kind tag does not name any counter kind.
    #[error("unknown counter kind tag: {0}")]
    UnknownKind(u8),

    /// A snapshot is internally inconsistent.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StorageError::SizeMismatch {
            expected: 3,
            found: 5,
        };
        assert_eq!(err.to_string(), "size mismatch: expected 3 bins, found 5");

        let err = StorageError::Allocation {
            kind: CounterKind::U16,
            size: 10,
        };
        assert_eq!(err.to_string(), "cannot allocate 10 counters of kind u16");

        assert_eq!(
            StorageError::UnknownKind(42).to_string(),
            "unknown counter kind tag: 42"
        );
    }
}
