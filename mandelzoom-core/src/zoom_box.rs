use crate::geometry::{BoxShape, Pixel};

/// Aspect-locked rubber-band selection in screen space.
///
/// The box itself never touches the view; [`View::zoom_box_end`] reads the
/// final corners and performs the zoom.
///
/// [`View::zoom_box_end`]: crate::View::zoom_box_end
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoomBox {
    active: bool,
    start: Pixel,
    end: Pixel,
    shape: BoxShape,
}

impl ZoomBox {
    pub fn begin(&mut self, x: i32, y: i32) {
        self.active = true;
        self.start = Pixel::new(x, y);
        self.end = self.start;
        self.shape = BoxShape {
            x: x as f32,
            y: y as f32,
            ..BoxShape::default()
        };
    }

    /// Stretch the box toward `(x, y)` keeping `width / height == aspect`.
    ///
    /// Whichever side is too short for the aspect ratio is grown to match the
    /// other, so the result is the largest aspect-correct box with one corner
    /// at the start point that reaches the cursor. Each axis keeps the sign of
    /// the drag. Returns the new shape, or `None` while inactive.
    pub fn stretch_to(&mut self, x: i32, y: i32, aspect: f64) -> Option<BoxShape> {
        if !self.active {
            return None;
        }
        let aspect = aspect as f32;
        let mut w = (x - self.start.x) as f32;
        let mut h = (y - self.start.y) as f32;

        if aspect * h.abs() > w.abs() {
            w = h.abs() * aspect * sign(w);
        } else {
            h = w.abs() / aspect * sign(h);
        }

        self.end = Pixel::new(self.start.x + w as i32, self.start.y + h as i32);
        self.shape = BoxShape {
            x: self.start.x.min(self.end.x) as f32,
            y: self.start.y.min(self.end.y) as f32,
            width: w.abs(),
            height: h.abs(),
        };
        Some(self.shape)
    }

    /// Deactivate and forget the shape.
    pub fn reset(&mut self) {
        self.active = false;
        self.shape = BoxShape::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&self) -> Pixel {
        self.start
    }

    pub fn end(&self) -> Pixel {
        self.end
    }

    /// Height of the finished box in whole pixels.
    pub fn pixel_height(&self) -> u32 {
        self.end.y.abs_diff(self.start.y)
    }

    pub fn shape(&self) -> BoxShape {
        self.shape
    }
}

/// `±1`, treating both zeros as positive.
#[inline]
fn sign(v: f32) -> f32 {
    if v.is_sign_negative() && v != 0.0 {
        -1.0
    } else {
        1.0
    }
}
