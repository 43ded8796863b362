//! Core module containing the adaptive storage and its building blocks.
//!
//! [`Storage`] is a dense array of bin counters. Every counter starts as the
//! narrowest integer and the whole buffer widens automatically when any
//! counter would overflow, or when a weighted value is mixed in.
//!
//! # Architecture
//!
//! ```text
//!   increase / add / merge / scale
//!                │
//!                ▼
//!   ┌──────────────────────────────┐      overflow?      ┌─────────────────┐
//!   │ match on the buffer variant  │ ──────────────────► │ build wider     │
//!   │  u8 u16 u32 u64 big w empty  │                     │ buffer, swap in │
//!   └──────────────────────────────┘ ◄────── retry ───── └─────────────────┘
//!                │
//!                ▼
//!        typed slice of counters
//! ```
//!
//! 1. Each operation matches on the [`CounterKind`] of the buffer and works on
//!    a typed slice.
//! 2. Checked arithmetic reports overflow instead of wrapping.
//! 3. On overflow every counter is converted into a newly allocated buffer of
//!    the next kind, which replaces the old one; the operation is retried.
//!
//! Reads ([`Storage::get`], equality) never promote.
//!
//! # Ownership
//!
//! `Storage` owns its buffer and has value semantics: clones are deep copies
//! and [`std::mem::take`] moves the buffer out, leaving an empty storage of
//! size zero behind. Promotion reallocates, so references into a storage
//! never survive a mutating call; the borrow checker enforces this.

pub mod addend;
pub mod arithmetic;
pub(crate) mod buffer;
pub mod kind;
pub mod vec_storage;
pub mod weight;

use std::fmt::Debug;
use std::ops::{AddAssign, MulAssign};

use crate::error::{Result, StorageError};
use addend::Addend;
use buffer::Buffer;
use kind::CounterKind;
use weight::WeightCounter;

/// Read access shared by all storages.
///
/// Any type exposing a size and indexed reads can be converted into, merged
/// into or compared with a [`Storage`].
pub trait StorageLike {
    /// Value of a single bin.
    type Element: Into<Addend>;

    /// Number of bins.
    fn size(&self) -> usize;

    /// Value of the bin at `index`.
    ///
    /// # Panics
    ///
    /// May panic if `index >= self.size()`.
    fn get(&self, index: usize) -> Self::Element;
}

/// Dense storage of bin counters with automatically widening precision.
///
/// # Examples
///
/// ```rust
/// use conteggi::{CounterKind, Storage};
///
/// let mut s = Storage::new(4);
/// assert_eq!(s.kind(), CounterKind::Empty);
///
/// for _ in 0..256 {
///     s.increase(2).unwrap();
/// }
/// assert_eq!(s.kind(), CounterKind::U16);
/// assert_eq!(s.get(2).value(), 256.0);
/// assert_eq!(s.get(0).value(), 0.0);
/// ```
///
/// Mixing in a weighted value converts every bin to a weighted counter:
///
/// ```rust
/// use conteggi::{weight, CounterKind, Storage};
///
/// let mut s = Storage::new(2);
/// s.increase(0).unwrap();
/// s.add(1, weight(5.0)).unwrap();
///
/// assert_eq!(s.kind(), CounterKind::Weighted);
/// assert_eq!((s.get(0).value(), s.get(0).variance()), (1.0, 1.0));
/// assert_eq!((s.get(1).value(), s.get(1).variance()), (5.0, 25.0));
/// ```
pub struct Storage {
    buffer: Buffer,
}

impl Storage {
    /// Creates a storage of `size` bins, all zero. Nothing is allocated
    /// until the first counter is touched.
    pub const fn new(size: usize) -> Self {
        Storage {
            buffer: Buffer::Empty(size),
        }
    }

    /// Builds a storage holding the values of any other storage.
    ///
    /// The result uses the narrowest representation the values need.
    ///
    /// ```rust
    /// use conteggi::{CounterKind, Storage, VecStorage};
    ///
    /// let mut v = VecStorage::<u32>::new(3);
    /// v.add(1, 1000);
    ///
    /// let s = Storage::from_storage(&v).unwrap();
    /// assert_eq!(s.kind(), CounterKind::U16);
    /// assert!(s.equals_storage(&v).unwrap());
    /// ```
    pub fn from_storage<S: StorageLike + ?Sized>(other: &S) -> Result<Self> {
        let mut storage = Storage::new(other.size());
        for i in 0..other.size() {
            storage.add(i, other.get(i))?;
        }
        Ok(storage)
    }

    /// Replaces the contents with the values of any other storage.
    ///
    /// On error `self` is left unchanged.
    pub fn assign_from<S: StorageLike + ?Sized>(&mut self, other: &S) -> Result<()> {
        *self = Storage::from_storage(other)?;
        Ok(())
    }

    /// Number of bins.
    #[inline]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Current representation of the counters.
    #[inline]
    pub fn kind(&self) -> CounterKind {
        self.buffer.kind()
    }

    /// Discards all counters and starts over with `size` empty bins.
    pub fn reset(&mut self, size: usize) {
        self.buffer.reset(size);
    }

    /// Adds one to the bin at `index`, widening the storage on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Allocation`] if a required promotion cannot
    /// allocate; the storage is then unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`, before touching the storage.
    #[inline]
    pub fn increase(&mut self, index: usize) -> Result<()> {
        assert!(index < self.size(), "bin index {index} out of range");
        self.buffer.increase(index)
    }

    /// Adds `x` to the bin at `index`.
    ///
    /// Integers keep the storage exact, widening it as needed. A weighted
    /// value converts every bin to a weighted counter.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Allocation`] if a required promotion cannot
    /// allocate; the storage is then unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`, before touching the storage.
    pub fn add(&mut self, index: usize, x: impl Into<Addend>) -> Result<()> {
        assert!(index < self.size(), "bin index {index} out of range");
        match x.into() {
            Addend::Int(n) => self.buffer.add_int(index, n),
            Addend::Big(n) => self.buffer.add_big(index, &n),
            Addend::Weighted(w) => self.buffer.add_weighted(index, w),
        }
    }

    /// Value of the bin at `index` as `(value, variance)`.
    ///
    /// Integer counts `n` read as `(n, n)`.
    #[inline]
    pub fn get(&self, index: usize) -> WeightCounter {
        debug_assert!(index < self.size(), "bin index {index} out of range");
        self.buffer.cell(index).weighted()
    }

    /// Iterates over the values of all bins.
    pub fn iter(&self) -> impl Iterator<Item = WeightCounter> + '_ {
        (0..self.size()).map(move |i| self.get(i))
    }

    /// Adds every bin of `other` into the bin with the same index.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::SizeMismatch`] if the sizes differ and
    /// [`StorageError::Allocation`] if widening fails. In both cases `self`
    /// is unchanged.
    pub fn merge(&mut self, other: &Storage) -> Result<()> {
        self.check_size(other.size())?;
        self.buffer.merge(&other.buffer)
    }

    /// Adds the storage to itself, doubling every bin.
    ///
    /// The source is copied first: widening the destination mid-merge would
    /// otherwise replace the buffer being read.
    pub fn merge_self(&mut self) -> Result<()> {
        let source = self.buffer.clone();
        self.buffer.merge(&source)
    }

    /// Adds every bin of any other storage into the bin with the same index.
    ///
    /// On error `self` is unchanged.
    pub fn merge_from<S: StorageLike + ?Sized>(&mut self, other: &S) -> Result<()> {
        self.check_size(other.size())?;
        let mut merged = self.clone();
        for i in 0..other.size() {
            merged.add(i, other.get(i))?;
        }
        *self = merged;
        Ok(())
    }

    /// Multiplies every bin by `x`.
    ///
    /// Scaling is inherently inexact, so the storage is converted to weighted
    /// counters first. Variances scale with `x²`.
    pub fn scale(&mut self, x: f64) -> Result<()> {
        self.buffer.scale(x)
    }

    /// Compares bin by bin, regardless of representation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::SizeMismatch`] if the sizes differ.
    pub fn try_eq(&self, other: &Storage) -> Result<bool> {
        self.check_size(other.size())?;
        Ok(self.buffer.equals(&other.buffer))
    }

    /// Compares bin by bin with any other storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::SizeMismatch`] if the sizes differ.
    pub fn equals_storage<S: StorageLike + ?Sized>(&self, other: &S) -> Result<bool> {
        self.check_size(other.size())?;
        Ok((0..self.size()).all(|i| {
            let addend: Addend = other.get(i).into();
            self.buffer.cell(i) == addend.cell()
        }))
    }

    fn check_size(&self, found: usize) -> Result<()> {
        if self.size() == found {
            Ok(())
        } else {
            Err(StorageError::SizeMismatch {
                expected: self.size(),
                found,
            })
        }
    }

    pub(crate) fn from_buffer(buffer: Buffer) -> Self {
        Storage { buffer }
    }

    pub(crate) fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}

impl StorageLike for Storage {
    type Element = WeightCounter;

    fn size(&self) -> usize {
        Storage::size(self)
    }

    fn get(&self, index: usize) -> WeightCounter {
        Storage::get(self, index)
    }
}

impl Default for Storage {
    /// An empty storage with no bins.
    fn default() -> Self {
        Storage::new(0)
    }
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        Storage {
            buffer: self.buffer.clone(),
        }
    }

    /// Copies in place when both storages share kind and size.
    fn clone_from(&mut self, source: &Self) {
        self.buffer.clone_from(&source.buffer);
    }
}

impl Debug for Storage {
    /// Formats as `kind[v0 v1 ...]`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.buffer.fmt(f)
    }
}

/// Storages of different sizes are never equal. Use [`Storage::try_eq`] to
/// treat a size mismatch as an error.
impl PartialEq for Storage {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.buffer.equals(&other.buffer)
    }
}

/// # Panics
///
/// Panics if the sizes differ or widening fails to allocate. Use
/// [`Storage::merge`] to handle these as errors.
impl AddAssign<&Storage> for Storage {
    fn add_assign(&mut self, rhs: &Storage) {
        if let Err(err) = self.merge(rhs) {
            panic!("cannot merge storages: {err}");
        }
    }
}

/// # Panics
///
/// Panics if converting to weighted counters fails to allocate. Use
/// [`Storage::scale`] to handle this as an error.
impl MulAssign<f64> for Storage {
    fn mul_assign(&mut self, x: f64) {
        if let Err(err) = self.scale(x) {
            panic!("cannot scale storage: {err}");
        }
    }
}
