use crate::complex::Complex;
use crate::error::CoreError;
use crate::real::Real;

/// Outcome of iterating a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// The orbit left the threshold disc on iteration `iterations`
    /// (zero-based).
    Escaped { iterations: u32 },

    /// The orbit stayed bounded for the whole budget: treated as inside the set.
    Interior,
}

impl Escape {
    /// Normalised divergence ratio in `[0, 1]`.
    ///
    /// Escaped points give `n / max_iterations`, which is always `< 1`;
    /// interior points give exactly `1.0`.
    #[inline]
    pub fn ratio(self, max_iterations: u32) -> f64 {
        match self {
            Self::Escaped { iterations } => iterations as f64 / max_iterations.max(1) as f64,
            Self::Interior => 1.0,
        }
    }

    #[inline]
    pub fn is_interior(self) -> bool {
        matches!(self, Self::Interior)
    }
}

/// Iteration budget and bailout for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeParams {
    /// Maximum number of iterations before declaring a point interior.
    pub max_iterations: u32,

    /// Squared bailout radius: the orbit has escaped once `|z|² > threshold_sq`.
    pub threshold_sq: f64,
}

impl EscapeParams {
    /// Iteration budget at zoom 0.
    pub const BASE_ITERATIONS: i64 = 120;
    /// Budget change per unit of zoom; zooming in (negative zoom) adds iterations.
    pub const ITERATIONS_PER_ZOOM: i64 = 10;
    /// `|z|² > 16`, i.e. a bailout radius of 4.
    pub const DEFAULT_THRESHOLD_SQ: f64 = 16.0;

    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        Ok(Self {
            max_iterations,
            threshold_sq: Self::DEFAULT_THRESHOLD_SQ,
        })
    }

    /// Adaptive budget: `120 − 10·floor(zoom)`, never below one iteration.
    ///
    /// Zoomed-out views (large zoom) get fewer iterations; detail is not
    /// visible there and every pixel costs the same.
    pub fn for_zoom(zoom: f64) -> Self {
        // `as` saturates, and NaN becomes 0.
        let steps = zoom.floor() as i64;
        let budget = Self::BASE_ITERATIONS.saturating_sub(steps.saturating_mul(Self::ITERATIONS_PER_ZOOM));
        Self {
            max_iterations: budget.clamp(1, u32::MAX as i64) as u32,
            threshold_sq: Self::DEFAULT_THRESHOLD_SQ,
        }
    }
}

/// An escape-time formula.
///
/// Renderers are generic over `F: Fractal<R>` (static dispatch) so the inner
/// loop is monomorphised per formula and numeric backend. Implementations must
/// be pure: the same point and parameters always give the same answer.
pub trait Fractal<R: Real>: Send + Sync {
    fn escape(&self, z0: &Complex<R>, params: &EscapeParams) -> Escape;

    /// [`escape`](Self::escape) folded to its normalised ratio.
    #[inline]
    fn escape_ratio(&self, z0: &Complex<R>, params: &EscapeParams) -> f64 {
        self.escape(z0, params).ratio(params.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_follows_zoom() {
        assert_eq!(EscapeParams::for_zoom(1.0).max_iterations, 110);
        assert_eq!(EscapeParams::for_zoom(0.0).max_iterations, 120);
        assert_eq!(EscapeParams::for_zoom(1.9).max_iterations, 110);
        // floor, not truncation
        assert_eq!(EscapeParams::for_zoom(-0.5).max_iterations, 130);
        assert_eq!(EscapeParams::for_zoom(-30.0).max_iterations, 420);
    }

    #[test]
    fn budget_never_drops_below_one() {
        assert_eq!(EscapeParams::for_zoom(11.0).max_iterations, 10);
        assert_eq!(EscapeParams::for_zoom(12.0).max_iterations, 1);
        assert_eq!(EscapeParams::for_zoom(500.0).max_iterations, 1);
        assert_eq!(EscapeParams::for_zoom(f64::INFINITY).max_iterations, 1);
        assert_eq!(EscapeParams::for_zoom(f64::NAN).max_iterations, 120);
    }

    #[test]
    fn huge_negative_zoom_saturates() {
        assert_eq!(EscapeParams::for_zoom(-1e300).max_iterations, u32::MAX);
    }

    #[test]
    fn explicit_budget_is_validated() {
        assert!(EscapeParams::new(0).is_err());
        let p = EscapeParams::new(50).unwrap();
        assert_eq!(p.max_iterations, 50);
        assert!((p.threshold_sq - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_is_one_only_for_interior() {
        assert_eq!(Escape::Interior.ratio(100), 1.0);
        assert_eq!(Escape::Escaped { iterations: 0 }.ratio(100), 0.0);
        assert!(Escape::Escaped { iterations: 99 }.ratio(100) < 1.0);
    }
}
