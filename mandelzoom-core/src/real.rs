use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// The numeric capability the view and the evaluator are written against.
///
/// `f64` is the default backend. Higher-precision types (see
/// [`DoubleDouble`](crate::DoubleDouble)) plug in without touching the
/// coordinate transform or the escape-time loop, pushing the usable zoom range
/// past the limits of native floating point.
///
/// The bound is `Clone` rather than `Copy` so heap-backed arbitrary-precision
/// types can implement it too.
pub trait Real:
    Clone
    + Debug
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Explicit conversion from a native double.
    fn from_f64(value: f64) -> Self;

    /// Explicit conversion to a native double (may lose precision).
    fn to_f64(&self) -> f64;

    fn abs(&self) -> Self;

    /// Integer power. Negative exponents produce the reciprocal.
    fn powi(&self, exp: i32) -> Self;

    /// Base-2 logarithm, used to derive the zoom exponent from a scale.
    fn log2(&self) -> f64 {
        self.to_f64().log2()
    }

    #[inline]
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    #[inline]
    fn one() -> Self {
        Self::from_f64(1.0)
    }
}

impl Real for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        *self
    }

    #[inline]
    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    #[inline]
    fn powi(&self, exp: i32) -> Self {
        f64::powi(*self, exp)
    }

    #[inline]
    fn log2(&self) -> f64 {
        f64::log2(*self)
    }
}

/// `2^exponent` evaluated in `R`.
///
/// The integer part is applied with [`Real::powi`] so a wider backend keeps
/// its own exponent range; only the fractional part goes through `f64`.
pub fn exp2<R: Real>(exponent: f64) -> R {
    let whole = exponent.floor();
    let frac = exponent - whole;
    let whole = whole.clamp(i32::MIN as f64, i32::MAX as f64) as i32;
    R::from_f64(frac.exp2()) * R::from_f64(2.0).powi(whole)
}
