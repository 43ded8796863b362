//! Values that can be added to a bin.

use num_bigint::{BigInt, BigUint};

use crate::storage::buffer::Cell;
use crate::storage::weight::{Weight, WeightCounter};

/// A value accepted by [`Storage::add`](crate::Storage::add).
///
/// Integral addends keep the storage on exact integer kinds. A weighted
/// addend forces the whole storage to [`CounterKind::Weighted`].
///
/// Negative integers are carried as [`Addend::Big`]: fixed-width unsigned
/// counters cannot hold them, so adding one promotes the storage to
/// arbitrary precision.
///
/// [`CounterKind::Weighted`]: crate::CounterKind::Weighted
#[derive(Debug, Clone, PartialEq)]
pub enum Addend {
    /// A non-negative integer count.
    Int(u64),
    /// An arbitrary precision integer count.
    Big(BigInt),
    /// A weighted contribution.
    Weighted(WeightCounter),
}

impl Addend {
    /// Returns `true` for integer addends.
    #[inline]
    pub fn is_integral(&self) -> bool {
        !matches!(self, Addend::Weighted(_))
    }

    pub(crate) fn cell(&self) -> Cell<'_> {
        match self {
            Addend::Int(n) => Cell::Int(*n),
            Addend::Big(n) => Cell::Big(n),
            Addend::Weighted(w) => Cell::Weighted(*w),
        }
    }
}

macro_rules! addend_from_unsigned {
    ($($t:ty),*) => { $(
        impl From<$t> for Addend {
            #[inline]
            fn from(x: $t) -> Self {
                Addend::Int(u64::from(x))
            }
        }
    )* }
}

macro_rules! addend_from_wide {
    ($($t:ty),*) => { $(
        impl From<$t> for Addend {
            #[inline]
            fn from(x: $t) -> Self {
                match u64::try_from(x) {
                    Ok(n) => Addend::Int(n),
                    Err(_) => Addend::Big(BigInt::from(x)),
                }
            }
        }
    )* }
}

addend_from_unsigned!(u8, u16, u32, u64);
addend_from_wide!(usize, u128, i8, i16, i32, i64, isize, i128);

impl From<BigInt> for Addend {
    fn from(x: BigInt) -> Self {
        Addend::Big(x)
    }
}

impl From<&BigInt> for Addend {
    fn from(x: &BigInt) -> Self {
        Addend::Big(x.clone())
    }
}

impl From<BigUint> for Addend {
    fn from(x: BigUint) -> Self {
        Addend::Big(BigInt::from(x))
    }
}

impl From<WeightCounter> for Addend {
    fn from(x: WeightCounter) -> Self {
        Addend::Weighted(x)
    }
}

impl From<Weight> for Addend {
    fn from(w: Weight) -> Self {
        Addend::Weighted(WeightCounter::from(w))
    }
}

/// A floating point count of `x` unit-weight entries.
impl From<f64> for Addend {
    fn from(x: f64) -> Self {
        Addend::Weighted(WeightCounter::from(x))
    }
}
