//! # Conteggi - Adaptive Counter Storage for Histograms
//!
//! A Rust library providing a dense array of bin counters whose precision
//! grows with the data. Each counter starts as a single byte and the storage
//! widens automatically, up to arbitrary precision integers and finally
//! weighted floating point counters that also track the variance.
//!
//! ## The Problem
//!
//! A histogram storage must pick a counter type. Narrow integers keep memory
//! small but overflow silently; wide integers waste memory on the many bins
//! that only ever see a handful of entries; floating point counters lose
//! exactness past 2⁵³. Weighted fills additionally need a second accumulator
//! for the variance, which unweighted fills never use.
//!
//! ## The Solution: Adaptive Storage
//!
//! This library never asks the caller to choose. All bins of a [`Storage`]
//! share one representation, the narrowest one able to hold every value
//! seen so far:
//!
//! ```text
//!   empty ─► u8 ─► u16 ─► u32 ─► u64 ─► bigint ─► weighted
//! ```
//!
//! 1. **Lazy allocation**: a new storage allocates nothing until the first
//!    counter is touched.
//! 2. **Checked arithmetic**: an increment that would overflow the current
//!    width is detected before anything is written.
//! 3. **Whole-buffer promotion**: on overflow every counter is converted to
//!    the next wider kind, the new buffer replaces the old one and the
//!    operation is retried. Values are preserved exactly.
//! 4. **Weighted mixing**: adding a weighted value converts every bin to a
//!    `(value, variance)` pair, unit-weight counts `n` becoming `(n, n)`.
//!
//! ## Quick Start
//!
//! ```rust
//! use conteggi::{weight, CounterKind, Storage};
//!
//! let mut bins = Storage::new(4);
//!
//! for _ in 0..300 {
//!     bins.increase(1)?;
//! }
//! assert_eq!(bins.kind(), CounterKind::U16);
//! assert_eq!(bins.get(1).value(), 300.0);
//!
//! bins.add(3, weight(0.5))?;
//! assert_eq!(bins.kind(), CounterKind::Weighted);
//! assert_eq!(bins.get(3).variance(), 0.25);
//! # Ok::<(), conteggi::StorageError>(())
//! ```
//!
//! ## Merging and Scaling
//!
//! ```rust
//! use conteggi::Storage;
//!
//! let mut a = Storage::new(2);
//! let mut b = Storage::new(2);
//! a.increase(0)?;
//! b.add(0, 255u8)?;
//!
//! a += &b;
//! assert_eq!(a.get(0).value(), 256.0);
//!
//! a *= 2.0;
//! assert_eq!(a.get(0).value(), 512.0);
//! assert_eq!(a.get(0).variance(), 1024.0);
//! # Ok::<(), conteggi::StorageError>(())
//! ```
//!
//! ## Thread Safety
//!
//! A `Storage` is a plain value: `Send` and `Sync`, mutated through `&mut`.
//! To fill from several threads, give each thread its own storage and merge
//! them afterwards with [`Storage::merge`].
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | `Serialize`/`Deserialize` for [`Storage`] and the [`snapshot`] types |

pub mod error;
pub mod snapshot;
pub mod storage;

pub use error::{Result, StorageError};
pub use snapshot::{SnapshotData, StorageSnapshot};
pub use storage::addend::Addend;
pub use storage::kind::CounterKind;
pub use storage::vec_storage::VecStorage;
pub use storage::weight::{weight, Weight, WeightCounter};
pub use storage::{Storage, StorageLike};
