use crate::complex::Complex;
use crate::fractal::{Escape, EscapeParams, Fractal};
use crate::real::Real;

/// The Mandelbrot set: `z_{n+1} = z_n² + z₀`, starting from `z = z₀`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mandelbrot;

/// Returns `true` if `c` lies inside the main cardioid.
///
/// A closed-form check that skips the whole budget for a large share of the
/// home view.
#[inline]
fn in_cardioid<R: Real>(c: &Complex<R>) -> bool {
    let quarter = R::from_f64(0.25);
    let im2 = c.im.clone() * c.im.clone();
    let x = c.re.clone() - quarter.clone();
    let q = x.clone() * x.clone() + im2.clone();
    q.clone() * (q + x) <= quarter * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb<R: Real>(c: &Complex<R>) -> bool {
    let x = c.re.clone() + R::one();
    x.clone() * x + c.im.clone() * c.im.clone() <= R::from_f64(0.0625)
}

impl<R: Real> Fractal<R> for Mandelbrot {
    fn escape(&self, z0: &Complex<R>, params: &EscapeParams) -> Escape {
        if in_cardioid(z0) || in_period2_bulb(z0) {
            return Escape::Interior;
        }

        let threshold = R::from_f64(params.threshold_sq);
        let mut z = z0.clone();
        for n in 0..params.max_iterations {
            z = z.square_add(z0);
            if z.norm_sq() > threshold {
                return Escape::Escaped { iterations: n };
            }
        }
        Escape::Interior
    }
}
