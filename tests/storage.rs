use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use conteggi::{weight, CounterKind, Storage, StorageError, VecStorage, WeightCounter};
use num_bigint::BigInt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Counts the buffer conversions logged by the crate.
#[derive(Clone, Default)]
struct PromotionCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for PromotionCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::DEBUG && meta.target().starts_with("conteggi") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` and returns how many times the buffer was converted.
fn promotions(f: impl FnOnce()) -> usize {
    let counter = PromotionCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f);
    counter.0.load(Ordering::SeqCst)
}

#[test]
fn test_255_increments_stay_u8() {
    let mut s = Storage::new(3);
    for _ in 0..255 {
        s.increase(1).unwrap();
    }
    assert_eq!(s.kind(), CounterKind::U8);
    assert_eq!(s.get(1), WeightCounter::new(255.0, 255.0));

    s.increase(1).unwrap();
    assert_eq!(s.kind(), CounterKind::U16);
    assert_eq!(s.get(1), WeightCounter::new(256.0, 256.0));
    assert_eq!(s.get(0), WeightCounter::new(0.0, 0.0));
    assert_eq!(s.get(2), WeightCounter::new(0.0, 0.0));
}

#[test]
fn test_promotion_through_every_kind() {
    let mut s = Storage::new(2);
    s.increase(1).unwrap();
    let mut seen = vec![s.kind()];
    // 256, 65_536, 2^32, then past u64::MAX
    for x in [256u64, 65_280, 4_294_901_760, u64::MAX] {
        s.add(0, x).unwrap();
        seen.push(s.kind());
    }
    s.add(0, weight(1.0)).unwrap();
    seen.push(s.kind());

    assert_eq!(seen, CounterKind::ALL[1..].to_vec());
    assert_eq!(s.get(1), WeightCounter::new(1.0, 1.0));
}

#[test]
fn test_weighted_mixing_forces_full_promotion() {
    let mut s = Storage::new(4);
    s.increase(0).unwrap();
    s.increase(2).unwrap();
    s.increase(2).unwrap();
    s.add(3, weight(5.0)).unwrap();

    assert_eq!(s.kind(), CounterKind::Weighted);
    assert_eq!(s.get(0), WeightCounter::new(1.0, 1.0));
    assert_eq!(s.get(1), WeightCounter::new(0.0, 0.0));
    assert_eq!(s.get(2), WeightCounter::new(2.0, 2.0));
    assert_eq!(s.get(3), WeightCounter::new(5.0, 25.0));

    s.increase(3).unwrap();
    assert_eq!(s.get(3), WeightCounter::new(6.0, 26.0));
}

#[test]
fn test_compare_with_vec_storage() {
    let mut adaptive = Storage::new(5);
    let mut plain = VecStorage::<u32>::new(5);
    assert!(adaptive.equals_storage(&plain).unwrap());

    adaptive.increase(0).unwrap();
    plain.increase(0);
    adaptive.add(4, 70_000u32).unwrap();
    plain.add(4, 70_000);
    assert!(adaptive.equals_storage(&plain).unwrap());

    plain.increase(1);
    assert!(!adaptive.equals_storage(&plain).unwrap());
    assert!(adaptive.equals_storage(&VecStorage::<u32>::new(4)).is_err());
}

#[test]
fn test_merge_mixed_kinds() {
    let mut a = Storage::new(3);
    a.increase(0).unwrap();
    let mut b = Storage::new(3);
    b.add(1, weight(3.0)).unwrap();

    let mut c = a.clone();
    c += &b;
    assert_eq!(c.kind(), CounterKind::Weighted);
    assert_eq!(c.get(0), WeightCounter::new(1.0, 1.0));
    assert_eq!(c.get(1), WeightCounter::new(3.0, 9.0));
    assert_eq!(c.get(2), WeightCounter::new(0.0, 0.0));

    let mut d = b.clone();
    d += &a;
    assert_eq!(c, d);
}

#[test]
fn test_merge_size_mismatch_mutates_neither() {
    let mut a = Storage::new(2);
    a.add(0, 300u32).unwrap();
    let mut b = Storage::new(3);
    b.add(0, weight(1.0)).unwrap();
    let (a_before, b_before) = (a.clone(), b.clone());

    assert_eq!(
        a.merge(&b),
        Err(StorageError::SizeMismatch {
            expected: 2,
            found: 3
        })
    );
    assert_eq!(a.kind(), CounterKind::U16);
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
    assert!(a.try_eq(&b).is_err());
}

#[test]
fn test_equality_ignores_representation() {
    let empty = Storage::new(4);
    let mut zeros = Storage::new(4);
    zeros.add(3, 0u8).unwrap();
    assert_eq!(zeros.kind(), CounterKind::U8);
    assert_eq!(empty, zeros);

    let mut small = Storage::new(2);
    small.increase(0).unwrap();
    let mut big = Storage::new(2);
    big.add(0, -1i32).unwrap();
    big.add(0, 2u8).unwrap();
    assert_eq!(big.kind(), CounterKind::BigInt);
    assert_eq!(small, big);
}

#[test]
fn test_scale_after_integers() {
    let mut s = Storage::new(3);
    s.add(0, 10u8).unwrap();
    s.add(1, 1u8).unwrap();
    s *= 3.0;
    assert_eq!(s.kind(), CounterKind::Weighted);
    assert_eq!(s.get(0), WeightCounter::new(30.0, 90.0));
    assert_eq!(s.get(1), WeightCounter::new(3.0, 9.0));
    assert_eq!(s.get(2), WeightCounter::new(0.0, 0.0));
}

#[test]
fn test_assignment_between_representations() {
    let mut a = Storage::new(2);
    a.add(0, weight(2.0)).unwrap();
    let mut b = Storage::new(4);
    b.increase(3).unwrap();

    a.clone_from(&b);
    assert_eq!(a.size(), 4);
    assert_eq!(a.kind(), CounterKind::U8);
    assert_eq!(a, b);

    let plain = VecStorage::from(vec![0u64, 1 << 33]);
    a.assign_from(&plain).unwrap();
    assert_eq!(a.size(), 2);
    assert_eq!(a.kind(), CounterKind::U64);
}

#[test]
fn test_large_add_converts_once() {
    let mut s = Storage::new(4);
    assert_eq!(promotions(|| s.add(0, 1u64 << 40).unwrap()), 1);
    assert_eq!(s.kind(), CounterKind::U64);

    let mut s = Storage::new(4);
    s.increase(1).unwrap();
    let huge = BigInt::from(u64::MAX) * 4u32;
    assert_eq!(promotions(|| s.add(0, &huge).unwrap()), 1);
    assert_eq!(s.kind(), CounterKind::BigInt);

    let mut s = Storage::new(4);
    s.increase(1).unwrap();
    assert_eq!(promotions(|| s.add(2, -1i32).unwrap()), 1);
    assert_eq!(s.kind(), CounterKind::BigInt);

    assert_eq!(promotions(|| s.increase(3).unwrap()), 0);
}

#[test]
fn test_failed_operations_leave_storage_unchanged() {
    let mut s = Storage::new(usize::MAX);
    assert!(matches!(
        s.increase(0),
        Err(StorageError::Allocation { .. })
    ));
    assert_eq!(s.kind(), CounterKind::Empty);
    assert!(matches!(
        s.add(0, u64::MAX),
        Err(StorageError::Allocation {
            kind: CounterKind::U64,
            ..
        })
    ));
    assert!(matches!(
        s.add(0, weight(1.0)),
        Err(StorageError::Allocation { .. })
    ));
    assert!(matches!(s.scale(0.5), Err(StorageError::Allocation { .. })));
    assert_eq!(s.kind(), CounterKind::Empty);
    assert_eq!(s.size(), usize::MAX);
}
