//! Overflow-checked arithmetic on fixed-width counters.
//!
//! Each helper reports whether the operation fit the target type. On `false`
//! the target is left untouched, which lets the caller promote the buffer and
//! retry without having to undo anything.

use num_traits::{PrimInt, Unsigned};

/// Increments `t` by one unless it already holds `T::MAX`.
///
/// # Examples
///
/// ```rust
/// use conteggi::storage::arithmetic::safe_increase;
///
/// let mut x = 254u8;
/// assert!(safe_increase(&mut x));
/// assert_eq!(x, 255);
/// assert!(!safe_increase(&mut x));
/// assert_eq!(x, 255);
/// ```
#[inline]
pub fn safe_increase<T: PrimInt + Unsigned>(t: &mut T) -> bool {
    if *t < T::max_value() {
        *t = *t + T::one();
        true
    } else {
        false
    }
}

/// Stores `u` into `t` if the value is representable in `T`.
///
/// Works between integers of any width and signedness.
///
/// # Examples
///
/// ```rust
/// use conteggi::storage::arithmetic::safe_assign;
///
/// let mut x = 0u8;
/// assert!(safe_assign(&mut x, 200u64));
/// assert_eq!(x, 200);
/// assert!(!safe_assign(&mut x, 300u64));
/// assert!(!safe_assign(&mut x, -1i32));
/// assert_eq!(x, 200);
/// ```
#[inline]
pub fn safe_assign<T: PrimInt, U: PrimInt>(t: &mut T, u: U) -> bool {
    match <T as num_traits::NumCast>::from(u) {
        Some(value) => {
            *t = value;
            true
        }
        None => false,
    }
}

/// Adds `u` to the unsigned counter `t` if the sum is representable in `T`.
///
/// Negative `u` never fits an unsigned counter and is rejected.
#[inline]
pub fn safe_radd<T: PrimInt + Unsigned, U: PrimInt>(t: &mut T, u: U) -> bool {
    let mut addend = T::zero();
    if !safe_assign(&mut addend, u) {
        return false;
    }
    match t.checked_add(&addend) {
        Some(sum) => {
            *t = sum;
            true
        }
        None => false,
    }
}
