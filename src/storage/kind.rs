//! Registry of the representations a bin counter can hold.
//!
//! The kinds form a strictly ordered chain. Promotion only ever moves a
//! buffer forward along this chain:
//!
//! ```text
//!   Empty ─► U8 ─► U16 ─► U32 ─► U64 ─► BigInt ─► Weighted
//! ```
//!
//! Any kind may also jump straight to [`CounterKind::Weighted`] when a
//! weighted value is mixed in or the storage is scaled.

use std::fmt::{self, Display};

use crate::error::{Result, StorageError};

/// The runtime representation shared by every element of a buffer.
///
/// The derived ordering is the promotion order.
///
/// # Examples
///
/// ```rust
/// use conteggi::CounterKind;
///
/// assert!(CounterKind::U8 < CounterKind::U16);
/// assert_eq!(CounterKind::U64.next(), Some(CounterKind::BigInt));
/// assert_eq!(CounterKind::Weighted.next(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum CounterKind {
    /// Logical zero in every bin, nothing allocated.
    #[default]
    Empty = 0,
    /// 8-bit unsigned counters.
    U8 = 1,
    /// 16-bit unsigned counters.
    U16 = 2,
    /// 32-bit unsigned counters.
    U32 = 3,
    /// 64-bit unsigned counters.
    U64 = 4,
    /// Arbitrary precision integers.
    BigInt = 5,
    /// Pairs of sum of weights and sum of squared weights.
    Weighted = 6,
}

impl CounterKind {
    /// All kinds, in promotion order.
    pub const ALL: [CounterKind; 7] = [
        CounterKind::Empty,
        CounterKind::U8,
        CounterKind::U16,
        CounterKind::U32,
        CounterKind::U64,
        CounterKind::BigInt,
        CounterKind::Weighted,
    ];

    /// Returns the next wider kind, or `None` for the terminal kind.
    pub const fn next(self) -> Option<CounterKind> {
        match self {
            CounterKind::Empty => Some(CounterKind::U8),
            CounterKind::U8 => Some(CounterKind::U16),
            CounterKind::U16 => Some(CounterKind::U32),
            CounterKind::U32 => Some(CounterKind::U64),
            CounterKind::U64 => Some(CounterKind::BigInt),
            CounterKind::BigInt => Some(CounterKind::Weighted),
            CounterKind::Weighted => None,
        }
    }

    /// Returns `true` for the kinds holding exact integer counts.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            CounterKind::U8
                | CounterKind::U16
                | CounterKind::U32
                | CounterKind::U64
                | CounterKind::BigInt
        )
    }

    /// Short lowercase name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            CounterKind::Empty => "empty",
            CounterKind::U8 => "u8",
            CounterKind::U16 => "u16",
            CounterKind::U32 => "u32",
            CounterKind::U64 => "u64",
            CounterKind::BigInt => "bigint",
            CounterKind::Weighted => "weighted",
        }
    }

    /// Smallest fixed-width kind able to hold `value`.
    ///
    /// Values beyond `u64::MAX` need [`CounterKind::BigInt`].
    pub(crate) fn fitting(value: u128) -> CounterKind {
        if value <= u128::from(u8::MAX) {
            CounterKind::U8
        } else if value <= u128::from(u16::MAX) {
            CounterKind::U16
        } else if value <= u128::from(u32::MAX) {
            CounterKind::U32
        } else if value <= u128::from(u64::MAX) {
            CounterKind::U64
        } else {
            CounterKind::BigInt
        }
    }
}

impl Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<CounterKind> for u8 {
    fn from(kind: CounterKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for CounterKind {
    type Error = StorageError;

    fn try_from(tag: u8) -> Result<Self> {
        CounterKind::ALL
            .get(usize::from(tag))
            .copied()
            .ok_or(StorageError::UnknownKind(tag))
    }
}
