//! Plain container storage with a fixed counter type.
//!
//! [`VecStorage`] keeps one `T` per bin and never changes representation.
//! It is the simplest [`StorageLike`] and a convenient reference when
//! checking what an adaptive [`Storage`](crate::Storage) holds.

use std::ops::Index;

use num_traits::NumAssign;

use crate::storage::addend::Addend;
use crate::storage::StorageLike;

/// A `Vec<T>` of bin counters.
///
/// Arithmetic follows `T`: a `VecStorage<u8>` overflows like a `u8` does.
///
/// # Examples
///
/// ```rust
/// use conteggi::VecStorage;
///
/// let mut v = VecStorage::<u32>::new(3);
/// v.increase(0);
/// v.add(2, 10);
/// assert_eq!(v.get(0), 1);
/// assert_eq!(v[2], 10);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VecStorage<T> {
    counts: Vec<T>,
}

impl<T: Copy + Default> VecStorage<T> {
    /// Creates `size` zeroed bins.
    pub fn new(size: usize) -> Self {
        VecStorage {
            counts: vec![T::default(); size],
        }
    }

    /// Number of bins.
    #[inline]
    pub fn size(&self) -> usize {
        self.counts.len()
    }

    /// Value of the bin at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        self.counts[index]
    }

    /// Discards all counters and starts over with `size` zeroed bins.
    pub fn reset(&mut self, size: usize) {
        self.counts.clear();
        self.counts.resize(size, T::default());
    }

    /// All counters as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.counts
    }
}

impl<T: Copy + Default + NumAssign> VecStorage<T> {
    /// Adds one to the bin at `index`.
    #[inline]
    pub fn increase(&mut self, index: usize) {
        self.counts[index] += T::one();
    }

    /// Adds `x` to the bin at `index`.
    #[inline]
    pub fn add(&mut self, index: usize, x: T) {
        self.counts[index] += x;
    }
}

impl<T> From<Vec<T>> for VecStorage<T> {
    fn from(counts: Vec<T>) -> Self {
        VecStorage { counts }
    }
}

impl<T> Index<usize> for VecStorage<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.counts[index]
    }
}

impl<T: Copy + Default + Into<Addend>> StorageLike for VecStorage<T> {
    type Element = T;

    fn size(&self) -> usize {
        VecStorage::size(self)
    }

    fn get(&self, index: usize) -> T {
        VecStorage::get(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CounterKind, Storage};

    #[test]
    fn test_new() {
        let v = VecStorage::<u16>::new(4);
        assert_eq!(v.size(), 4);
        assert_eq!(v.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_increase_and_add() {
        let mut v = VecStorage::<u64>::new(2);
        v.increase(1);
        v.add(1, 41);
        assert_eq!(v.get(1), 42);
        assert_eq!(v[0], 0);
    }

    #[test]
    fn test_reset() {
        let mut v = VecStorage::from(vec![1u8, 2, 3]);
        v.reset(2);
        assert_eq!(v.as_slice(), &[0, 0]);
    }

    #[test]
    fn test_storage_from_vec_storage() {
        let v = VecStorage::from(vec![0u64, 70_000, 3]);
        let s = Storage::from_storage(&v).unwrap();
        assert_eq!(s.kind(), CounterKind::U32);
        assert!(s.equals_storage(&v).unwrap());
    }

    #[test]
    fn test_storage_from_float_storage() {
        let v = VecStorage::from(vec![0.5f64, 2.0]);
        let s = Storage::from_storage(&v).unwrap();
        assert_eq!(s.kind(), CounterKind::Weighted);
        assert_eq!(s.get(0).value(), 0.5);
        assert_eq!(s.get(0).variance(), 0.5);
    }

    #[test]
    fn test_merge_from_vec_storage() {
        let mut s = Storage::new(3);
        s.increase(0).unwrap();
        let v = VecStorage::from(vec![1u32, 0, 300]);
        s.merge_from(&v).unwrap();
        assert_eq!(s.get(0).value(), 2.0);
        assert_eq!(s.get(2).value(), 300.0);
        assert_eq!(s.kind(), CounterKind::U16);
    }

    #[test]
    fn test_merge_from_size_mismatch() {
        let mut s = Storage::new(3);
        let v = VecStorage::<u8>::new(2);
        assert!(s.merge_from(&v).is_err());
        assert_eq!(s.kind(), CounterKind::Empty);
    }

    #[test]
    fn test_assign_from_picks_narrowest_kind() {
        let mut s = Storage::new(1);
        s.add(0, u64::MAX).unwrap();
        s.assign_from(&VecStorage::from(vec![1u64, 2])).unwrap();
        assert_eq!(s.size(), 2);
        assert_eq!(s.kind(), CounterKind::U8);
    }

    #[test]
    fn test_equals_storage_detects_difference() {
        let mut s = Storage::new(2);
        s.increase(1).unwrap();
        assert!(!s.equals_storage(&VecStorage::from(vec![0u8, 2])).unwrap());
        assert!(s.equals_storage(&VecStorage::from(vec![0u8, 1])).unwrap());
    }
}
