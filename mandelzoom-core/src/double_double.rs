use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::real::Real;

/// A double-double floating-point number: ~31 significant decimal digits.
///
/// Stores a value as `hi + lo` using two `f64` components with the invariant
/// `|lo| ≤ ε·|hi|`. Arithmetic uses Knuth's TwoSum and FMA-based TwoProd
/// (error-free transformations) to maintain full precision.
///
/// This is the high-precision [`Real`] backend: swapping it in for `f64`
/// roughly doubles the number of zoom levels before pixels collapse onto the
/// same plane coordinate.
///
/// Reference: Hida, Li, Bailey — "Library for Double-Double and Quad-Double
/// Arithmetic" (2001).
#[derive(Debug, Clone, Copy)]
pub struct DoubleDouble {
    pub hi: f64,
    pub lo: f64,
}

// ---------------------------------------------------------------------------
// Error-free building blocks
// ---------------------------------------------------------------------------

/// Knuth's TwoSum: `(s, e)` with `s + e = a + b` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let v = s - a;
    let e = (a - (s - v)) + (b - v);
    (s, e)
}

/// TwoSum for `|a| >= |b|`.
#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// FMA-based TwoProd: `(p, e)` with `p + e = a * b` exactly.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

impl DoubleDouble {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };
    pub const ONE: Self = Self { hi: 1.0, lo: 0.0 };

    #[inline]
    pub fn new(hi: f64, lo: f64) -> Self {
        let (hi, lo) = two_sum(hi, lo);
        Self { hi, lo }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    /// `self * self`, one TwoProd cheaper than the general product.
    #[inline]
    pub fn square(self) -> Self {
        let (p1, p2) = two_prod(self.hi, self.hi);
        let p2 = p2 + 2.0 * self.hi * self.lo;
        let (hi, lo) = quick_two_sum(p1, p2);
        Self { hi, lo }
    }

    /// Integer power by repeated squaring; negative exponents divide.
    pub fn powi(self, exp: i32) -> Self {
        let mut base = self;
        let mut n = exp.unsigned_abs();
        let mut acc = Self::ONE;
        while n > 0 {
            if n & 1 == 1 {
                acc = acc * base;
            }
            base = base.square();
            n >>= 1;
        }
        if exp < 0 {
            Self::ONE / acc
        } else {
            acc
        }
    }
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(val: f64) -> Self {
        Self { hi: val, lo: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

impl Add for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s1, s2) = two_sum(self.hi, rhs.hi);
        let (t1, t2) = two_sum(self.lo, rhs.lo);
        let s2 = s2 + t1;
        let (s1, s2) = quick_two_sum(s1, s2);
        let s2 = s2 + t2;
        let (hi, lo) = quick_two_sum(s1, s2);
        Self { hi, lo }
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p1, p2) = two_prod(self.hi, rhs.hi);
        let p2 = p2 + self.hi * rhs.lo + self.lo * rhs.hi;
        let (hi, lo) = quick_two_sum(p1, p2);
        Self { hi, lo }
    }
}

impl Div for DoubleDouble {
    type Output = Self;

    /// Long division with three correction steps.
    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi / rhs.hi;
        let r = self - rhs * Self::from(q1);
        let q2 = r.hi / rhs.hi;
        let r = r - rhs * Self::from(q2);
        let q3 = r.hi / rhs.hi;
        let (hi, lo) = quick_two_sum(q1, q2);
        Self { hi, lo } + Self::from(q3)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

impl PartialEq for DoubleDouble {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&other.lo),
            ord => ord,
        }
    }
}

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+e}", self.to_f64())
    }
}

impl Real for DoubleDouble {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self::from(value)
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        DoubleDouble::to_f64(*self)
    }

    #[inline]
    fn abs(&self) -> Self {
        DoubleDouble::abs(*self)
    }

    #[inline]
    fn powi(&self, exp: i32) -> Self {
        DoubleDouble::powi(*self, exp)
    }

    /// `log2(hi)` plus the first-order correction from `lo`.
    fn log2(&self) -> f64 {
        self.hi.log2() + self.lo / (self.hi * std::f64::consts::LN_2)
    }
}
