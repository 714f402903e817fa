use crate::complex::Complex;
use crate::real::Real;

/// An axis-aligned rectangle on the complex plane.
///
/// `left`/`top` is the corner with the smallest coordinates; `width` and
/// `height` are positive for any rectangle produced by a [`View`](crate::View).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<R = f64> {
    pub left: R,
    pub top: R,
    pub width: R,
    pub height: R,
}

impl<R: Real> Rect<R> {
    pub fn new(left: R, top: R, width: R, height: R) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Complex<R> {
        Complex::new(self.left.clone(), self.top.clone())
    }

    pub fn centre(&self) -> Complex<R> {
        let half = R::from_f64(0.5);
        Complex::new(
            self.left.clone() + half.clone() * self.width.clone(),
            self.top.clone() + half * self.height.clone(),
        )
    }
}

/// Integer screen position. `(0, 0)` is the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Integer midpoint, truncating toward zero.
    pub fn midpoint(self, other: Pixel) -> Pixel {
        Pixel::new((self.x + other.x) / 2, (self.y + other.y) / 2)
    }
}

/// Drawing-surface dimensions in pixels. Both sides are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// The on-screen rectangle of an active zoom box, ready to be outlined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxShape {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}
