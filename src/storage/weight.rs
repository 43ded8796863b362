//! Weighted counter: a count and its variance.
//!
//! A bin filled with weights `w_1 .. w_n` holds `value = Σ w_i` and
//! `variance = Σ w_i²`. Unit-weight fills keep `value == variance`, so an
//! integer count `n` is equivalent to `WeightCounter::new(n, n)`.

use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Mul, MulAssign};

use bytemuck::{Pod, Zeroable};

/// A `(value, variance)` pair accumulated by weighted fills.
///
/// # Examples
///
/// ```rust
/// use conteggi::WeightCounter;
///
/// let mut c = WeightCounter::default();
/// c.increment();
/// c += WeightCounter::new(5.0, 25.0);
/// assert_eq!(c.value(), 6.0);
/// assert_eq!(c.variance(), 26.0);
///
/// c *= 2.0;
/// assert_eq!(c.value(), 12.0);
/// assert_eq!(c.variance(), 104.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct WeightCounter {
    value: f64,
    variance: f64,
}

impl WeightCounter {
    /// Creates a counter holding the given sum of weights and sum of squared weights.
    pub const fn new(value: f64, variance: f64) -> Self {
        WeightCounter { value, variance }
    }

    /// Sum of weights.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Sum of squared weights.
    #[inline]
    pub const fn variance(&self) -> f64 {
        self.variance
    }

    /// Adds one unit-weight entry.
    #[inline]
    pub fn increment(&mut self) {
        self.value += 1.0;
        self.variance += 1.0;
    }

    /// Returns `true` if both accumulators are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value == 0.0 && self.variance == 0.0
    }
}

impl Display for WeightCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.value, self.variance)
    }
}

/// A count of `x` unit-weight entries.
impl From<f64> for WeightCounter {
    fn from(x: f64) -> Self {
        WeightCounter::new(x, x)
    }
}

impl AddAssign for WeightCounter {
    #[inline]
    fn add_assign(&mut self, rhs: WeightCounter) {
        self.value += rhs.value;
        self.variance += rhs.variance;
    }
}

/// Adds `x` unit-weight entries.
impl AddAssign<f64> for WeightCounter {
    #[inline]
    fn add_assign(&mut self, x: f64) {
        self.value += x;
        self.variance += x;
    }
}

impl Add for WeightCounter {
    type Output = WeightCounter;

    fn add(mut self, rhs: WeightCounter) -> WeightCounter {
        self += rhs;
        self
    }
}

/// Scales the value by `x` and the variance by `x²`.
impl MulAssign<f64> for WeightCounter {
    #[inline]
    fn mul_assign(&mut self, x: f64) {
        self.value *= x;
        self.variance *= x * x;
    }
}

impl Mul<f64> for WeightCounter {
    type Output = WeightCounter;

    fn mul(mut self, x: f64) -> WeightCounter {
        self *= x;
        self
    }
}

/// Equal to a plain count `x` when both accumulators equal `x`.
impl PartialEq<f64> for WeightCounter {
    fn eq(&self, x: &f64) -> bool {
        self.value == *x && self.variance == *x
    }
}

/// Weight of a single weighted fill.
///
/// Adding `Weight(w)` to a bin contributes `w` to its value and `w²` to its
/// variance.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Weight(pub f64);

impl From<Weight> for WeightCounter {
    fn from(w: Weight) -> Self {
        WeightCounter::new(w.0, w.0 * w.0)
    }
}

/// Shorthand for [`Weight`].
///
/// ```rust
/// use conteggi::{weight, Storage};
///
/// let mut s = Storage::new(2);
/// s.add(1, weight(3.0)).unwrap();
/// assert_eq!(s.get(1).value(), 3.0);
/// assert_eq!(s.get(1).variance(), 9.0);
/// ```
pub const fn weight(w: f64) -> Weight {
    Weight(w)
}
