use std::fmt;

use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::geometry::{BoxShape, Pixel, Rect, ScreenSize};
use crate::real::{exp2, Real};
use crate::zoom_box::ZoomBox;

/// Navigation state: which part of the complex plane is on screen.
///
/// The view is centred on `centre`, and `scale` is half the visible height in
/// plane units, with `scale = 2^zoom`. The visible rectangle is cached in
/// `viewport` and refreshed by every mutator, so readers never recompute and
/// never observe stale derived state.
///
/// Every mutator that changes what is visible also raises the dirty flag. Only
/// the render controller lowers it, when it starts reacting to the change.
#[derive(Debug, Clone)]
pub struct View<R: Real = f64> {
    centre: Complex<R>,
    scale: R,
    zoom: f64,
    viewport: Rect<R>,
    screen: ScreenSize,
    aspect_ratio: R,
    dirty: bool,
    zoom_box: ZoomBox,
}

impl<R: Real> View<R> {
    /// Centre of the home view.
    pub const HOME_CENTRE: (f64, f64) = (-0.5, 0.0);
    /// Zoom of the home view (`scale = 2`).
    pub const HOME_ZOOM: f64 = 1.0;

    /// Create a view centred on `centre` at the given zoom exponent.
    ///
    /// The view starts dirty so the first frame gets rendered.
    pub fn new(centre: Complex<R>, zoom: f64, width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidScreenSize { width, height });
        }
        let scale = exp2::<R>(zoom);
        if !zoom.is_finite() || !is_usable_scale(&scale) {
            return Err(CoreError::InvalidZoom(zoom));
        }
        let aspect_ratio = R::from_f64(width as f64) / R::from_f64(height as f64);
        let mut view = Self {
            viewport: Rect::new(R::zero(), R::zero(), R::zero(), R::zero()),
            centre,
            scale,
            zoom,
            screen: ScreenSize { width, height },
            aspect_ratio,
            dirty: true,
            zoom_box: ZoomBox::default(),
        };
        view.update_viewport();
        Ok(view)
    }

    /// The whole Mandelbrot set, centred on `(-0.5, 0)` at zoom 1.
    pub fn home(width: u32, height: u32) -> crate::Result<Self> {
        let (re, im) = Self::HOME_CENTRE;
        Self::new(Complex::from_f64(re, im), Self::HOME_ZOOM, width, height)
    }

    // -- Readers -------------------------------------------------------------

    pub fn centre(&self) -> &Complex<R> {
        &self.centre
    }

    pub fn scale(&self) -> &R {
        &self.scale
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport(&self) -> &Rect<R> {
        &self.viewport
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn aspect_ratio(&self) -> &R {
        &self.aspect_ratio
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn zoom_box(&self) -> &ZoomBox {
        &self.zoom_box
    }

    // -- Navigation ----------------------------------------------------------

    /// Pan by `(dx, dy)` in units of `scale`, so a pan of `1.0` always covers
    /// half the visible height whatever the zoom.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        let step = Complex::from_f64(dx, dy).scaled(&self.scale);
        self.centre = self.centre.clone() + step;
        self.touch();
    }

    pub fn move_to(&mut self, x: R, y: R) {
        self.move_to_point(Complex::new(x, y));
    }

    pub fn move_to_point(&mut self, centre: Complex<R>) {
        self.centre = centre;
        self.touch();
    }

    /// Set the zoom exponent. Exponents whose scale the backend cannot
    /// represent as a finite positive number are ignored.
    pub fn zoom_to(&mut self, zoom: f64) {
        let scale = exp2::<R>(zoom);
        if !zoom.is_finite() || !is_usable_scale(&scale) {
            debug!(zoom, "Ignoring out-of-range zoom");
            return;
        }
        self.zoom = zoom;
        self.scale = scale;
        self.touch();
    }

    pub fn zoom_by(&mut self, dz: f64) {
        self.zoom_to(self.zoom + dz);
    }

    /// Set the scale directly and derive `zoom = log2(scale)`.
    ///
    /// Non-positive (or non-finite) scales have no meaning and are ignored.
    pub fn set_scale(&mut self, scale: R) {
        if !is_usable_scale(&scale) {
            debug!(scale = ?scale, "Ignoring non-positive scale");
            return;
        }
        self.zoom = scale.log2();
        self.scale = scale;
        self.touch();
    }

    /// Show the given plane rectangle.
    ///
    /// Centre and scale come from the rectangle; the width is then re-derived
    /// from the screen's aspect ratio so the cached viewport stays consistent.
    pub fn set_viewport(&mut self, rect: Rect<R>) {
        let scale = R::from_f64(0.5) * rect.height.clone();
        if !is_usable_scale(&scale) {
            debug!("Ignoring viewport with non-positive height");
            return;
        }
        self.centre = rect.centre();
        self.zoom = scale.log2();
        self.scale = scale;
        self.touch();
    }

    /// Adapt to a new drawing-surface size.
    ///
    /// The scale follows the height ratio so each pixel row keeps covering
    /// the same slice of the plane. Zero sizes (a minimised window) are
    /// ignored.
    pub fn resize_screen(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!(width, height, "Ignoring degenerate screen size");
            return;
        }
        let ratio = R::from_f64(height as f64) / R::from_f64(self.screen.height as f64);
        let scale = self.scale.clone() * ratio;
        if is_usable_scale(&scale) {
            self.zoom = scale.log2();
            self.scale = scale;
        }
        self.screen = ScreenSize { width, height };
        self.aspect_ratio = R::from_f64(width as f64) / R::from_f64(height as f64);
        self.touch();
    }

    // -- Coordinate transform ------------------------------------------------

    /// Map a pixel to the plane.
    ///
    /// Pixel `(W/2, H/2)` maps to the centre; one pixel step is
    /// `2·scale / H` in both directions.
    pub fn complex_at_pixel(&self, x: i32, y: i32) -> Complex<R> {
        let per_pixel = self.scale.clone() / R::from_f64(self.screen.height as f64);
        let dx = 2 * x as i64 - self.screen.width as i64;
        let dy = 2 * y as i64 - self.screen.height as i64;
        Complex::new(
            self.centre.re.clone() + per_pixel.clone() * R::from_f64(dx as f64),
            self.centre.im.clone() + per_pixel * R::from_f64(dy as f64),
        )
    }

    /// Map a plane point to the nearest pixel; the inverse of
    /// [`complex_at_pixel`](Self::complex_at_pixel).
    ///
    /// Points far off screen saturate at the `i32` range.
    pub fn pixel_at_complex(&self, point: &Complex<R>) -> Pixel {
        let pixels_per_unit = R::from_f64(self.screen.height as f64) / self.scale.clone();
        let half = R::from_f64(0.5);
        let px = half.clone()
            * ((point.re.clone() - self.centre.re.clone()) * pixels_per_unit.clone()
                + R::from_f64(self.screen.width as f64));
        let py = half
            * ((point.im.clone() - self.centre.im.clone()) * pixels_per_unit
                + R::from_f64(self.screen.height as f64));
        Pixel::new(px.to_f64().round() as i32, py.to_f64().round() as i32)
    }

    // -- Zoom box ------------------------------------------------------------

    pub fn zoom_box_begin(&mut self, x: i32, y: i32) {
        self.zoom_box.begin(x, y);
    }

    /// Stretch the active zoom box toward the cursor. The view is untouched.
    pub fn zoom_box_continue(&mut self, x: i32, y: i32) -> Option<BoxShape> {
        let aspect = self.aspect_ratio.to_f64();
        self.zoom_box.stretch_to(x, y, aspect)
    }

    /// Finish the zoom box: centre on it and scale to its height.
    ///
    /// A box of zero height would mean zero scale, so it only deactivates.
    /// Releasing without an active box does nothing.
    pub fn zoom_box_end(&mut self, x: i32, y: i32) {
        if self.zoom_box_continue(x, y).is_none() {
            return;
        }
        let height = self.zoom_box.pixel_height();
        if height > 0 {
            let mid = self.zoom_box.start().midpoint(self.zoom_box.end());
            let target = self.complex_at_pixel(mid.x, mid.y);
            self.move_to_point(target);
            let factor = R::from_f64(height as f64 / self.screen.height as f64);
            self.set_scale(self.scale.clone() * factor);
        }
        self.zoom_box.reset();
    }

    pub fn zoom_box_cancel(&mut self) {
        self.zoom_box.reset();
    }

    // -- Internals -----------------------------------------------------------

    fn touch(&mut self) {
        self.dirty = true;
        self.update_viewport();
    }

    fn update_viewport(&mut self) {
        let half_w = self.scale.clone() * self.aspect_ratio.clone();
        let half_h = self.scale.clone();
        let two = R::from_f64(2.0);
        self.viewport = Rect::new(
            self.centre.re.clone() - half_w.clone(),
            self.centre.im.clone() - half_h.clone(),
            two.clone() * half_w,
            two * half_h,
        );
    }
}

/// `scale > 0` and finite; anything else would collapse or blow up the view.
fn is_usable_scale<R: Real>(scale: &R) -> bool {
    *scale > R::zero() && scale.to_f64().is_finite()
}

impl<R: Real> fmt::Display for View<R> {
    /// `( re, im ) @ zoom -> [ left, top, width, height ]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "( {:+e}, {:+e} ) @ {:+e} -> [ {:+e}, {:+e}, {:e}, {:e} ]",
            self.centre.re.to_f64(),
            self.centre.im.to_f64(),
            self.zoom,
            self.viewport.left.to_f64(),
            self.viewport.top.to_f64(),
            self.viewport.width.to_f64(),
            self.viewport.height.to_f64(),
        )
    }
}
