//! Serde round trips, using JSON as the archive format.

use conteggi::{weight, CounterKind, SnapshotData, Storage, StorageSnapshot, WeightCounter};
use num_bigint::BigInt;

fn roundtrip(storage: &Storage) -> Storage {
    let json = serde_json::to_string(storage).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_roundtrip_empty() {
    let storage = Storage::new(5);
    let restored = roundtrip(&storage);
    assert_eq!(restored.kind(), CounterKind::Empty);
    assert_eq!(restored.size(), 5);
    assert_eq!(restored, storage);
}

#[test]
fn test_roundtrip_integer_kinds() {
    let values: [u64; 4] = [200, 60_000, 4_000_000_000, 1 << 50];
    let kinds = [CounterKind::U8, CounterKind::U16, CounterKind::U32, CounterKind::U64];
    for (value, kind) in values.into_iter().zip(kinds) {
        let mut storage = Storage::new(3);
        storage.add(1, value).unwrap();
        storage.increase(2).unwrap();
        assert_eq!(storage.kind(), kind);

        let restored = roundtrip(&storage);
        assert_eq!(restored.kind(), kind);
        assert_eq!(restored, storage);
    }
}

#[test]
fn test_roundtrip_bigint_beyond_64_bits() {
    let mut storage = Storage::new(2);
    let huge = BigInt::from(u64::MAX) * BigInt::from(u64::MAX);
    storage.add(0, huge.clone()).unwrap();
    storage.add(1, -5i64).unwrap();
    assert_eq!(storage.kind(), CounterKind::BigInt);

    let restored = roundtrip(&storage);
    assert_eq!(restored.kind(), CounterKind::BigInt);
    assert_eq!(restored, storage);
    assert_eq!(restored.snapshot().data, SnapshotData::BigInts(vec![huge, BigInt::from(-5)]));
}

#[test]
fn test_roundtrip_mixed_variances() {
    let mut storage = Storage::new(3);
    storage.increase(0).unwrap();
    storage.add(1, weight(0.1)).unwrap();
    storage.add(1, weight(2.5)).unwrap();
    storage.add(2, WeightCounter::new(1.0 / 3.0, 7.0)).unwrap();

    let restored = roundtrip(&storage);
    assert_eq!(restored.kind(), CounterKind::Weighted);
    assert_eq!(restored, storage);
    assert_eq!(restored.get(0), WeightCounter::new(1.0, 1.0));
}

#[test]
fn test_snapshot_json_shape() {
    let mut storage = Storage::new(2);
    storage.increase(1).unwrap();
    let json = serde_json::to_value(storage.snapshot()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "u8",
            "size": 2,
            "data": { "Bytes": [0, 1] }
        })
    );
}

#[test]
fn test_reject_corrupt_json() {
    let snapshot = StorageSnapshot {
        kind: CounterKind::U64,
        size: 2,
        data: SnapshotData::Bytes(vec![1, 2, 3]),
    };
    let json = serde_json::to_string(&snapshot).unwrap();
    let err = serde_json::from_str::<Storage>(&json).unwrap_err();
    assert!(err.to_string().contains("corrupt snapshot"));
}
