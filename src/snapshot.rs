//! Snapshot types for persisting storage state.
//!
//! A [`StorageSnapshot`] captures the kind tag, the number of bins and the
//! raw counter data of a [`Storage`]. It holds no behavior of its own: the
//! caller picks the archive format. With the `serde` feature enabled,
//! snapshots and storages implement `Serialize` and `Deserialize`, so any
//! serde data format can act as the archiver.
//!
//! # Feature Flag
//!
//! ```toml
//! [dependencies]
//! conteggi = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use conteggi::Storage;
//!
//! let mut storage = Storage::new(3);
//! storage.add(1, 1000u32).unwrap();
//!
//! let snapshot = storage.snapshot();
//! let restored = Storage::from_snapshot(snapshot).unwrap();
//! assert_eq!(restored, storage);
//! ```
//!
//! ```rust,ignore
//! // With the `serde` feature:
//! let json = serde_json::to_string(&storage).unwrap();
//! let restored: Storage = serde_json::from_str(&json).unwrap();
//! ```

use std::mem::size_of;

use bytemuck::Pod;
use num_bigint::BigInt;

use crate::error::{Result, StorageError};
use crate::storage::buffer::Buffer;
use crate::storage::kind::CounterKind;
use crate::Storage;

/// Raw counter data of a snapshot.
///
/// Fixed-width kinds, weighted counters included, are stored as their
/// element bytes in native byte order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SnapshotData {
    /// Nothing allocated.
    Empty,
    /// Element bytes of a fixed-width buffer.
    Bytes(Vec<u8>),
    /// Arbitrary precision counters.
    BigInts(Vec<BigInt>),
}

/// Persistable state of a [`Storage`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageSnapshot {
    /// Kind of every counter.
    pub kind: CounterKind,
    /// Number of bins.
    pub size: usize,
    /// Counter data, matching `kind`.
    pub data: SnapshotData,
}

fn encode<T: Pod>(cells: &[T]) -> SnapshotData {
    SnapshotData::Bytes(bytemuck::cast_slice(cells).to_vec())
}

fn decode<T: Pod>(kind: CounterKind, size: usize, bytes: &[u8]) -> Result<Box<[T]>> {
    let expected = size.checked_mul(size_of::<T>());
    if expected != Some(bytes.len()) {
        return Err(StorageError::CorruptSnapshot(format!(
            "{kind} buffer of {size} counters cannot hold {} bytes",
            bytes.len()
        )));
    }
    Ok(bytemuck::pod_collect_to_vec::<u8, T>(bytes).into_boxed_slice())
}

impl Storage {
    /// Captures kind, size and counter data.
    pub fn snapshot(&self) -> StorageSnapshot {
        let data = match self.buffer() {
            Buffer::U8(cells) => encode(&cells[..]),
            Buffer::U16(cells) => encode(&cells[..]),
            Buffer::U32(cells) => encode(&cells[..]),
            Buffer::U64(cells) => encode(&cells[..]),
            Buffer::BigInt(cells) => SnapshotData::BigInts(cells.to_vec()),
            Buffer::Weighted(cells) => encode(&cells[..]),
            Buffer::Empty(_) => SnapshotData::Empty,
        };
        StorageSnapshot {
            kind: self.kind(),
            size: self.size(),
            data,
        }
    }

    /// Rebuilds a storage from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptSnapshot`] if the data does not match
    /// the declared kind and size.
    pub fn from_snapshot(snapshot: StorageSnapshot) -> Result<Storage> {
        let StorageSnapshot { kind, size, data } = snapshot;
        let buffer = match (kind, data) {
            (CounterKind::U8, SnapshotData::Bytes(bytes)) => Buffer::U8(decode(kind, size, &bytes)?),
            (CounterKind::U16, SnapshotData::Bytes(bytes)) => {
                Buffer::U16(decode(kind, size, &bytes)?)
            }
            (CounterKind::U32, SnapshotData::Bytes(bytes)) => {
                Buffer::U32(decode(kind, size, &bytes)?)
            }
            (CounterKind::U64, SnapshotData::Bytes(bytes)) => {
                Buffer::U64(decode(kind, size, &bytes)?)
            }
            (CounterKind::BigInt, SnapshotData::BigInts(cells)) => {
                if cells.len() != size {
                    return Err(StorageError::CorruptSnapshot(format!(
                        "expected {size} bigint counters, found {}",
                        cells.len()
                    )));
                }
                Buffer::BigInt(cells.into_boxed_slice())
            }
            (CounterKind::Weighted, SnapshotData::Bytes(bytes)) => {
                Buffer::Weighted(decode(kind, size, &bytes)?)
            }
            (CounterKind::Empty, SnapshotData::Empty) => Buffer::Empty(size),
            (kind, _) => {
                return Err(StorageError::CorruptSnapshot(format!(
                    "data does not match counter kind {kind}"
                )))
            }
        };
        Ok(Storage::from_buffer(buffer))
    }
}

impl From<&Storage> for StorageSnapshot {
    fn from(storage: &Storage) -> Self {
        storage.snapshot()
    }
}

impl TryFrom<StorageSnapshot> for Storage {
    type Error = StorageError;

    fn try_from(snapshot: StorageSnapshot) -> Result<Self> {
        Storage::from_snapshot(snapshot)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Storage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.snapshot(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Storage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let snapshot = <StorageSnapshot as serde::Deserialize>::deserialize(deserializer)?;
        Storage::from_snapshot(snapshot).map_err(serde::de::Error::custom)
    }
}
