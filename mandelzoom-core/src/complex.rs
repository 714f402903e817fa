use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::real::Real;

/// A point on the complex plane, generic over the numeric backend.
///
/// `re` runs left to right across the screen and `im` runs top to bottom,
/// matching pixel order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex<R = f64> {
    pub re: R,
    pub im: R,
}

impl<R> Complex<R> {
    #[inline]
    pub fn new(re: R, im: R) -> Self {
        Self { re, im }
    }
}

impl<R: Real> Complex<R> {
    pub fn zero() -> Self {
        Self::new(R::zero(), R::zero())
    }

    /// Lift an `f64` point into the backend.
    pub fn from_f64(re: f64, im: f64) -> Self {
        Self::new(R::from_f64(re), R::from_f64(im))
    }

    /// Lossy projection to `f64`, for logging and display.
    pub fn to_f64(&self) -> Complex<f64> {
        Complex::new(self.re.to_f64(), self.im.to_f64())
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(&self) -> R {
        self.re.clone() * self.re.clone() + self.im.clone() * self.im.clone()
    }

    /// `self² + c`, the step of the quadratic recurrence.
    #[inline]
    pub fn square_add(&self, c: &Self) -> Self {
        let re = self.re.clone() * self.re.clone() - self.im.clone() * self.im.clone()
            + c.re.clone();
        let two_re_im = self.re.clone() * self.im.clone();
        let im = two_re_im.clone() + two_re_im + c.im.clone();
        Self { re, im }
    }

    /// Scale both components by a real factor.
    #[inline]
    pub fn scaled(&self, k: &R) -> Self {
        Self::new(self.re.clone() * k.clone(), self.im.clone() * k.clone())
    }
}

impl<R: Real> Add for Complex<R> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl<R: Real> Sub for Complex<R> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl<R: Real> Mul for Complex<R> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re.clone() * rhs.re.clone() - self.im.clone() * rhs.im.clone(),
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl<R: Real> Neg for Complex<R> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl<R: Real> std::fmt::Display for Complex<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:+e}, {:+e})", self.re.to_f64(), self.im.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DoubleDouble;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn multiplication() {
        // (1 + 2i)(3 + 4i) = -5 + 10i
        let c = Complex::new(1.0, 2.0) * Complex::new(3.0, 4.0);
        assert!(approx_eq(c.re, -5.0));
        assert!(approx_eq(c.im, 10.0));
    }

    #[test]
    fn square_add_matches_mul_then_add() {
        let z = Complex::new(0.3, -1.1);
        let c = Complex::new(-0.5, 0.25);
        let expected = z * z + c;
        let got = z.square_add(&c);
        assert!(approx_eq(got.re, expected.re));
        assert!(approx_eq(got.im, expected.im));
    }

    #[test]
    fn norm_sq() {
        assert!(approx_eq(Complex::new(3.0, 4.0).norm_sq(), 25.0));
    }

    #[test]
    fn generic_over_double_double() {
        let z: Complex<DoubleDouble> = Complex::from_f64(1.0, 1.0);
        let z2 = z.clone() * z;
        assert!(approx_eq(z2.re.to_f64(), 0.0));
        assert!(approx_eq(z2.im.to_f64(), 2.0));
    }

    #[test]
    fn deserializes_from_json() {
        let c: Complex = serde_json::from_str(r#"{"re": -0.5, "im": 0.0}"#).unwrap();
        assert_eq!(c, Complex::new(-0.5, 0.0));
    }
}
