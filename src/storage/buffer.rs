//! Tagged buffer of counters and the operations dispatched over it.
//!
//! A [`Buffer`] holds `size` counters that all share one [`CounterKind`].
//! Every operation matches on the variant and works on a correctly typed
//! slice. The match arms are ordered with the fixed-width integer kinds
//! first and `Empty` last, since a touched buffer has always left `Empty`.
//!
//! Promotion never mutates in place: the wider buffer is fully built from
//! the current one and only then swapped in. A failed allocation therefore
//! leaves the buffer exactly as it was.

use std::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use tracing::{debug, trace};

use crate::error::{Result, StorageError};
use crate::storage::arithmetic::{safe_assign, safe_increase, safe_radd};
use crate::storage::kind::CounterKind;
use crate::storage::weight::WeightCounter;

/// Runs `$body` with `$cells` bound to the typed slice of any allocated
/// variant, or `$empty` with `$size` bound for [`Buffer::Empty`].
macro_rules! dispatch {
    ($buffer:expr, $cells:ident => $body:expr, $size:ident => $empty:expr) => {
        match $buffer {
            Buffer::U8($cells) => $body,
            Buffer::U16($cells) => $body,
            Buffer::U32($cells) => $body,
            Buffer::U64($cells) => $body,
            Buffer::BigInt($cells) => $body,
            Buffer::Weighted($cells) => $body,
            Buffer::Empty($size) => $empty,
        }
    };
}

/// Storage for `size` counters of a single kind.
pub(crate) enum Buffer {
    Empty(usize),
    U8(Box<[u8]>),
    U16(Box<[u16]>),
    U32(Box<[u32]>),
    U64(Box<[u64]>),
    BigInt(Box<[BigInt]>),
    Weighted(Box<[WeightCounter]>),
}

/// Decoded view of a single counter, independent of the buffer kind.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cell<'a> {
    Int(u64),
    Big(&'a BigInt),
    Weighted(WeightCounter),
}

/// Converts to `f64`, saturating to infinity beyond the float range.
fn big_to_f64(n: &BigInt) -> f64 {
    n.to_f64().unwrap_or(match n.sign() {
        Sign::Minus => f64::NEG_INFINITY,
        _ => f64::INFINITY,
    })
}

impl Cell<'_> {
    /// Value as a weighted counter; integer counts `n` map to `(n, n)`.
    pub(crate) fn weighted(self) -> WeightCounter {
        match self {
            Cell::Int(n) => WeightCounter::from(n as f64),
            Cell::Big(n) => WeightCounter::from(big_to_f64(n)),
            Cell::Weighted(w) => w,
        }
    }
}

/// Integers compare exactly. A weighted counter equals an integer `n` when
/// both its accumulators equal `n`.
impl PartialEq for Cell<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Int(a), Cell::Big(b)) | (Cell::Big(b), Cell::Int(a)) => b.to_u64() == Some(a),
            (Cell::Big(a), Cell::Big(b)) => a == b,
            (Cell::Weighted(a), Cell::Weighted(b)) => a == b,
            (Cell::Weighted(w), plain) | (plain, Cell::Weighted(w)) => {
                w == plain.weighted().value()
            }
        }
    }
}

/// Element type of a [`Buffer`] variant.
pub(crate) trait Counter: Clone {
    const KIND: CounterKind;

    fn cell(&self) -> Cell<'_>;

    /// Converts a decoded value into this type, `None` if it does not fit.
    fn from_cell(cell: Cell<'_>) -> Option<Self>;
}

macro_rules! fixed_width_counter {
    ($($t:ty => $kind:ident),*) => { $(
        impl Counter for $t {
            const KIND: CounterKind = CounterKind::$kind;

            #[inline]
            fn cell(&self) -> Cell<'_> {
                Cell::Int(u64::from(*self))
            }

            fn from_cell(cell: Cell<'_>) -> Option<Self> {
                let value = match cell {
                    Cell::Int(n) => n,
                    Cell::Big(n) => n.to_u64()?,
                    Cell::Weighted(_) => return None,
                };
                let mut counter: $t = 0;
                safe_assign(&mut counter, value).then_some(counter)
            }
        }
    )* }
}

fixed_width_counter!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

impl Counter for BigInt {
    const KIND: CounterKind = CounterKind::BigInt;

    #[inline]
    fn cell(&self) -> Cell<'_> {
        Cell::Big(self)
    }

    fn from_cell(cell: Cell<'_>) -> Option<Self> {
        match cell {
            Cell::Int(n) => Some(BigInt::from(n)),
            Cell::Big(n) => Some(n.clone()),
            Cell::Weighted(_) => None,
        }
    }
}

impl Counter for WeightCounter {
    const KIND: CounterKind = CounterKind::Weighted;

    #[inline]
    fn cell(&self) -> Cell<'_> {
        Cell::Weighted(*self)
    }

    fn from_cell(cell: Cell<'_>) -> Option<Self> {
        Some(cell.weighted())
    }
}

impl Buffer {
    /// Number of counters.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        dispatch!(self, cells => cells.len(), size => *size)
    }

    /// Current kind of every counter in the buffer.
    pub(crate) fn kind(&self) -> CounterKind {
        match self {
            Buffer::U8(_) => CounterKind::U8,
            Buffer::U16(_) => CounterKind::U16,
            Buffer::U32(_) => CounterKind::U32,
            Buffer::U64(_) => CounterKind::U64,
            Buffer::BigInt(_) => CounterKind::BigInt,
            Buffer::Weighted(_) => CounterKind::Weighted,
            Buffer::Empty(_) => CounterKind::Empty,
        }
    }

    /// Decoded counter at `index`.
    #[inline]
    pub(crate) fn cell(&self, index: usize) -> Cell<'_> {
        dispatch!(self, cells => cells[index].cell(), _size => Cell::Int(0))
    }

    /// Discards all counters and starts over with `size` empty bins.
    pub(crate) fn reset(&mut self, size: usize) {
        trace!(from = %self.kind(), size, "resetting counter buffer");
        *self = Buffer::Empty(size);
    }

    /// Builds a fresh slice of `T` holding the value of every counter.
    fn converted<T: Counter>(&self) -> Result<Box<[T]>> {
        let size = self.len();
        let from = self.kind();
        let convert =
            |cell: Cell<'_>| T::from_cell(cell).ok_or(StorageError::Conversion { from, to: T::KIND });

        let mut out: Vec<T> = Vec::new();
        out.try_reserve_exact(size)
            .map_err(|_| StorageError::Allocation { kind: T::KIND, size })?;
        dispatch!(
            self,
            cells => {
                for counter in cells.iter() {
                    out.push(convert(counter.cell())?);
                }
            },
            size => out.resize(*size, convert(Cell::Int(0))?)
        );
        Ok(out.into_boxed_slice())
    }

    /// Converts every counter to `target`. Does nothing unless `target` is
    /// wider than the current kind.
    pub(crate) fn promote_to(&mut self, target: CounterKind) -> Result<()> {
        let from = self.kind();
        if target <= from {
            return Ok(());
        }
        let promoted = match target {
            CounterKind::U8 => Buffer::U8(self.converted()?),
            CounterKind::U16 => Buffer::U16(self.converted()?),
            CounterKind::U32 => Buffer::U32(self.converted()?),
            CounterKind::U64 => Buffer::U64(self.converted()?),
            CounterKind::BigInt => Buffer::BigInt(self.converted()?),
            CounterKind::Weighted => Buffer::Weighted(self.converted()?),
            CounterKind::Empty => Buffer::Empty(self.len()),
        };
        debug!(%from, to = %target, size = self.len(), "promoting counter buffer");
        *self = promoted;
        Ok(())
    }

    /// Narrowest kind, never narrower than the current one, that holds the
    /// counter at `index` once `addend` is added to it.
    fn kind_after_add(&self, index: usize, addend: Cell<'_>) -> CounterKind {
        let current = self.kind();
        if current >= CounterKind::BigInt {
            return current;
        }
        let n = match addend {
            Cell::Int(n) => n,
            Cell::Big(n) => match n.to_u64() {
                Some(n) => n,
                None => return CounterKind::BigInt,
            },
            Cell::Weighted(_) => return CounterKind::Weighted,
        };
        match self.cell(index) {
            Cell::Int(a) => current.max(CounterKind::fitting(u128::from(a) + u128::from(n))),
            Cell::Big(_) | Cell::Weighted(_) => current,
        }
    }

    /// Adds one to the counter at `index`.
    ///
    /// The target kind is chosen before anything is allocated, so the buffer
    /// is converted at most once.
    pub(crate) fn increase(&mut self, index: usize) -> Result<()> {
        self.promote_to(self.kind_after_add(index, Cell::Int(1)))?;
        let done = match self {
            Buffer::U8(cells) => safe_increase(&mut cells[index]),
            Buffer::U16(cells) => safe_increase(&mut cells[index]),
            Buffer::U32(cells) => safe_increase(&mut cells[index]),
            Buffer::U64(cells) => safe_increase(&mut cells[index]),
            Buffer::BigInt(cells) => {
                cells[index] += 1u32;
                true
            }
            Buffer::Weighted(cells) => {
                cells[index].increment();
                true
            }
            Buffer::Empty(_) => false,
        };
        debug_assert!(done, "counter {index} overflowed after promotion");
        Ok(())
    }

    /// Adds a non-negative integer to the counter at `index`.
    pub(crate) fn add_int(&mut self, index: usize, n: u64) -> Result<()> {
        self.promote_to(self.kind_after_add(index, Cell::Int(n)))?;
        let done = match self {
            Buffer::U8(cells) => safe_radd(&mut cells[index], n),
            Buffer::U16(cells) => safe_radd(&mut cells[index], n),
            Buffer::U32(cells) => safe_radd(&mut cells[index], n),
            Buffer::U64(cells) => safe_radd(&mut cells[index], n),
            Buffer::BigInt(cells) => {
                cells[index] += n;
                true
            }
            Buffer::Weighted(cells) => {
                cells[index] += n as f64;
                true
            }
            Buffer::Empty(_) => false,
        };
        debug_assert!(done, "counter {index} overflowed after promotion");
        Ok(())
    }

    /// Adds an arbitrary precision integer to the counter at `index`.
    ///
    /// Negative values and values beyond `u64` go straight to `BigInt`.
    pub(crate) fn add_big(&mut self, index: usize, n: &BigInt) -> Result<()> {
        self.promote_to(self.kind_after_add(index, Cell::Big(n)))?;
        let done = match self {
            Buffer::U8(cells) => n.to_u64().is_some_and(|v| safe_radd(&mut cells[index], v)),
            Buffer::U16(cells) => n.to_u64().is_some_and(|v| safe_radd(&mut cells[index], v)),
            Buffer::U32(cells) => n.to_u64().is_some_and(|v| safe_radd(&mut cells[index], v)),
            Buffer::U64(cells) => n.to_u64().is_some_and(|v| safe_radd(&mut cells[index], v)),
            Buffer::BigInt(cells) => {
                cells[index] += n;
                true
            }
            Buffer::Weighted(cells) => {
                cells[index] += big_to_f64(n);
                true
            }
            Buffer::Empty(_) => false,
        };
        debug_assert!(done, "counter {index} overflowed after promotion");
        Ok(())
    }

    /// Adds a weighted contribution to the counter at `index`, converting
    /// the whole buffer to weighted counters first.
    pub(crate) fn add_weighted(&mut self, index: usize, w: WeightCounter) -> Result<()> {
        self.promote_to(CounterKind::Weighted)?;
        if let Buffer::Weighted(cells) = self {
            cells[index] += w;
        }
        Ok(())
    }

    /// Compares two buffers of equal length counter by counter.
    ///
    /// Missing data in an `Empty` buffer reads as zero.
    pub(crate) fn equals(&self, other: &Buffer) -> bool {
        debug_assert_eq!(self.len(), other.len());
        match (self, other) {
            (Buffer::U8(a), Buffer::U8(b)) => a == b,
            (Buffer::U16(a), Buffer::U16(b)) => a == b,
            (Buffer::U32(a), Buffer::U32(b)) => a == b,
            (Buffer::U64(a), Buffer::U64(b)) => a == b,
            (Buffer::BigInt(a), Buffer::BigInt(b)) => a == b,
            (Buffer::Weighted(a), Buffer::Weighted(b)) => a == b,
            (Buffer::Empty(_), Buffer::Empty(_)) => true,
            _ => (0..self.len()).all(|i| self.cell(i) == other.cell(i)),
        }
    }

    /// Smallest kind able to hold the pointwise sum of `self` and `src`.
    fn merged_kind(&self, src: &Buffer) -> CounterKind {
        let widest = self.kind().max(src.kind());
        if src.kind() == CounterKind::Empty || widest >= CounterKind::BigInt {
            return widest;
        }
        let mut kind = widest;
        for i in 0..src.len() {
            if let (Cell::Int(a), Cell::Int(b)) = (self.cell(i), src.cell(i)) {
                kind = kind.max(CounterKind::fitting(u128::from(a) + u128::from(b)));
                if kind == CounterKind::BigInt {
                    break;
                }
            }
        }
        kind
    }

    /// Adds every counter of `src` into the counter with the same index.
    ///
    /// The destination is promoted once, up front, to a kind wide enough
    /// for every sum, so a failed allocation leaves it untouched.
    pub(crate) fn merge(&mut self, src: &Buffer) -> Result<()> {
        debug_assert_eq!(self.len(), src.len());
        self.promote_to(self.merged_kind(src))?;
        if let Buffer::Empty(_) = src {
            return Ok(());
        }
        for i in 0..src.len() {
            match src.cell(i) {
                Cell::Int(0) => {}
                Cell::Int(n) => self.add_int(i, n)?,
                Cell::Big(n) => self.add_big(i, n)?,
                Cell::Weighted(w) => self.add_weighted(i, w)?,
            }
        }
        Ok(())
    }

    /// Multiplies every counter by `x`. The buffer always ends up weighted.
    pub(crate) fn scale(&mut self, x: f64) -> Result<()> {
        self.promote_to(CounterKind::Weighted)?;
        if let Buffer::Weighted(cells) = self {
            for counter in cells.iter_mut() {
                *counter *= x;
            }
        }
        Ok(())
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        match self {
            Buffer::U8(cells) => Buffer::U8(cells.clone()),
            Buffer::U16(cells) => Buffer::U16(cells.clone()),
            Buffer::U32(cells) => Buffer::U32(cells.clone()),
            Buffer::U64(cells) => Buffer::U64(cells.clone()),
            Buffer::BigInt(cells) => Buffer::BigInt(cells.clone()),
            Buffer::Weighted(cells) => Buffer::Weighted(cells.clone()),
            Buffer::Empty(size) => Buffer::Empty(*size),
        }
    }

    /// Reuses the existing allocation when kind and length already match.
    fn clone_from(&mut self, source: &Self) {
        match (self, source) {
            (Buffer::U8(a), Buffer::U8(b)) if a.len() == b.len() => a.copy_from_slice(b),
            (Buffer::U16(a), Buffer::U16(b)) if a.len() == b.len() => a.copy_from_slice(b),
            (Buffer::U32(a), Buffer::U32(b)) if a.len() == b.len() => a.copy_from_slice(b),
            (Buffer::U64(a), Buffer::U64(b)) if a.len() == b.len() => a.copy_from_slice(b),
            (Buffer::BigInt(a), Buffer::BigInt(b)) if a.len() == b.len() => a.clone_from_slice(b),
            (Buffer::Weighted(a), Buffer::Weighted(b)) if a.len() == b.len() => {
                a.copy_from_slice(b)
            }
            (this, source) => *this = source.clone(),
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.kind())?;
        for i in 0..self.len() {
            if i > 0 {
                write!(f, " ")?;
            }
            match self.cell(i) {
                Cell::Int(n) => write!(f, "{n}")?,
                Cell::Big(n) => write!(f, "{n}")?,
                Cell::Weighted(w) => write!(f, "{w}")?,
            }
        }
        write!(f, "]")
    }
}
