use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use mandelzoom_core::{Complex, Fractal, Mandelbrot, Real, ScreenSize, View};

use crate::buffer::PixelBuffer;
use crate::input::{EventOutcome, InputEvent, MouseButton};
use crate::surface::{Sprite, Surface};
use crate::worker::{PassOutcome, RenderJob, RenderWorker};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// A pass is running; `in_progress` is partially transparent.
    Rendering,
    /// The pass finished but has not been shown and promoted yet.
    Completed,
    /// The finished frame is on screen; nothing to redraw until the view changes.
    Displayed,
}

impl RenderState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rendering => "Rendering\u{2026}",
            Self::Completed => "Completed",
            Self::Displayed => "Done",
        }
    }
}

/// Progressive render controller.
///
/// Owns the live [`View`], the view of the last finished frame, both frame
/// buffers and the background worker. Input is applied through
/// [`handle_event`](Self::handle_event); [`tick`](Self::tick) is called once
/// per presentation frame and decides what, if anything, to redraw.
///
/// While a pass runs, the last finished frame is drawn scaled and offset to
/// where it belongs in the current view (the "rough" draw) and the partial
/// pass is layered on top. Once the pass completes, its buffer becomes the new
/// finished frame by swapping the two buffer handles.
pub struct Controller<R: Real, F = Mandelbrot> {
    view: View<R>,
    completed_view: View<R>,
    home_centre: Complex<R>,
    home_zoom: f64,

    in_progress: Arc<PixelBuffer>,
    completed: Arc<PixelBuffer>,
    state: RenderState,
    frames_displayed: u64,

    worker: RenderWorker<R>,
    active_pass: Option<u64>,
    next_pass_id: u64,

    surface_size: Option<ScreenSize>,
    outline_shown: bool,
    scratch: Vec<u8>,

    _fractal: PhantomData<fn() -> F>,
}

impl<R: Real, F: Fractal<R> + 'static> Controller<R, F> {
    /// Take ownership of `view` and start a worker running `fractal` on
    /// `threads` threads (`0` = one per core).
    ///
    /// The view's initial centre and zoom become the target of
    /// [`InputEvent::Reset`]. A freshly built view is dirty, so the first
    /// [`tick`](Self::tick) launches a pass.
    pub fn new(view: View<R>, fractal: F, threads: usize) -> crate::Result<Self> {
        let worker = RenderWorker::spawn(fractal, threads)?;
        let screen = view.screen();
        info!(width = screen.width, height = screen.height, view = %view, "Controller ready");

        Ok(Self {
            completed_view: view.clone(),
            home_centre: view.centre().clone(),
            home_zoom: view.zoom(),
            in_progress: Arc::new(PixelBuffer::new(screen.width, screen.height)),
            completed: Arc::new(PixelBuffer::new(screen.width, screen.height)),
            state: RenderState::Displayed,
            frames_displayed: 0,
            worker,
            active_pass: None,
            next_pass_id: 0,
            surface_size: None,
            outline_shown: false,
            scratch: Vec::new(),
            view,
            _fractal: PhantomData,
        })
    }
}

impl<R: Real, F> Controller<R, F> {
    // -- Readers -------------------------------------------------------------

    pub fn view(&self) -> &View<R> {
        &self.view
    }

    /// Direct access for callers that drive the view themselves. Changes that
    /// should trigger a render must go through a dirtying mutator.
    pub fn view_mut(&mut self) -> &mut View<R> {
        &mut self.view
    }

    pub fn completed_view(&self) -> &View<R> {
        &self.completed_view
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Number of finished frames promoted so far.
    pub fn frames_displayed(&self) -> u64 {
        self.frames_displayed
    }

    /// Rows finished by the current pass, as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        self.worker.cancel().progress()
    }

    /// `true` while another [`tick`](Self::tick) would draw something.
    pub fn needs_redraw(&self) -> bool {
        self.view.is_dirty()
            || self.state != RenderState::Displayed
            || self.view.zoom_box().is_active()
            || self.outline_shown
    }

    /// Copy of the last finished frame as RGBA8.
    pub fn completed_rgba(&self) -> Vec<u8> {
        self.completed.to_rgba8()
    }

    /// Copy of the frame currently being rendered as RGBA8.
    pub fn in_progress_rgba(&self) -> Vec<u8> {
        self.in_progress.to_rgba8()
    }

    // -- Input ---------------------------------------------------------------

    pub fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        match event {
            InputEvent::Pan { dx, dy } => self.view.move_by(dx, dy),
            InputEvent::Zoom { delta } => self.view.zoom_by(delta),
            InputEvent::Reset => {
                self.view.move_to_point(self.home_centre.clone());
                self.view.zoom_to(self.home_zoom);
            }
            InputEvent::MouseDown { button, x, y } => match button {
                MouseButton::Left => self.view.zoom_box_begin(x, y),
                MouseButton::Right => self.view.zoom_box_cancel(),
                MouseButton::Middle => {}
            },
            InputEvent::MouseMove { x, y } => {
                self.view.zoom_box_continue(x, y);
            }
            InputEvent::MouseUp { button, x, y } => {
                if button == MouseButton::Left {
                    self.view.zoom_box_end(x, y);
                }
            }
            InputEvent::CancelZoomBox => self.view.zoom_box_cancel(),
            InputEvent::Resize { width, height } => self.resize(width, height),
            InputEvent::Close => {
                self.cancel_active();
                info!("Closing");
                return EventOutcome::Exit;
            }
        }
        EventOutcome::Continue
    }

    /// Cancel the running pass, resize both views and reallocate the buffers.
    /// The view is left dirty so the next tick relaunches.
    fn resize(&mut self, width: u32, height: u32) {
        let current = self.view.screen();
        if width == 0 || height == 0 || (current.width == width && current.height == height) {
            return;
        }
        self.cancel_active();

        self.view.resize_screen(width, height);
        self.completed_view.resize_screen(width, height);
        self.in_progress = Arc::new(PixelBuffer::new(width, height));
        self.completed = Arc::new(PixelBuffer::new(width, height));
        self.view.set_dirty(true);
        info!(width, height, "Resized");
    }

    // -- Frame ---------------------------------------------------------------

    /// Advance one presentation frame. Returns whether anything was presented.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let screen = self.view.screen();
        if self.surface_size != Some(screen) {
            surface.resize(screen.width, screen.height);
            self.surface_size = Some(screen);
        }

        let mut presented = false;

        if self.view.is_dirty() {
            self.view.set_dirty(false);
            info!(view = %self.view, "View changed");

            self.cancel_active();
            self.rough_draw(surface);
            surface.present();
            presented = true;

            self.in_progress.clear();
            self.launch();
        }

        self.poll_worker();

        let zoom_box_active = self.view.zoom_box().is_active();
        let mut drawn = false;

        // The finished frame is the background for a partial pass or a zoom
        // box, and has to be redrawn once to erase a box that just went away.
        if self.state == RenderState::Rendering || zoom_box_active || self.outline_shown {
            self.rough_draw(surface);
            drawn = true;
        }

        if self.state != RenderState::Displayed {
            self.detailed_draw(surface);
            drawn = true;
        }

        if self.state == RenderState::Completed {
            std::mem::swap(&mut self.in_progress, &mut self.completed);
            self.completed_view = self.view.clone();
            self.completed_view.set_dirty(false);
            self.state = RenderState::Displayed;
            self.frames_displayed += 1;
            debug!(frame = self.frames_displayed, "Frame promoted");
        }

        if zoom_box_active {
            surface.draw_outline(&self.view.zoom_box().shape());
            drawn = true;
        }
        self.outline_shown = zoom_box_active;

        if drawn {
            surface.present();
        }
        presented || drawn
    }

    /// Last finished frame, moved and scaled to where it sits in the current view.
    fn rough_draw<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.completed.snapshot_into(&mut self.scratch);
        let origin = self
            .view
            .pixel_at_complex(&self.completed_view.viewport().top_left());
        let scale = (self.completed_view.scale().clone() / self.view.scale().clone()).to_f64();

        surface.clear();
        surface.update(&self.scratch, self.completed.width(), self.completed.height());
        surface.draw(Sprite {
            x: origin.x as f32,
            y: origin.y as f32,
            scale: scale as f32,
        });
    }

    /// The pass in flight (or just finished) at 1:1.
    fn detailed_draw<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.in_progress.snapshot_into(&mut self.scratch);
        surface.update(&self.scratch, self.in_progress.width(), self.in_progress.height());
        surface.draw(Sprite::IDENTITY);
    }

    // -- Worker --------------------------------------------------------------

    fn launch(&mut self) {
        let id = self.next_pass_id;
        self.next_pass_id += 1;

        let job = RenderJob {
            id,
            generation: self.worker.cancel().generation(),
            view: self.view.clone(),
            buffer: Arc::clone(&self.in_progress),
        };
        self.state = RenderState::Rendering;

        match self.worker.launch(job) {
            Ok(()) => {
                debug!(id, "Pass launched");
                self.active_pass = Some(id);
            }
            Err(e) => {
                error!(%e, "Could not launch render pass");
                self.active_pass = None;
                self.state = RenderState::Completed;
            }
        }
    }

    /// Cancel the active pass and block until the worker acknowledges it.
    fn cancel_active(&mut self) {
        let Some(id) = self.active_pass.take() else {
            return;
        };
        self.worker.cancel().cancel();

        loop {
            match self.worker.wait_report() {
                Ok(report) if report.id == id => {
                    debug!(id, "Pass acknowledged");
                    break;
                }
                Ok(report) => debug!(id = report.id, "Discarding stale report"),
                Err(e) => {
                    error!(%e, "Lost render worker while cancelling");
                    break;
                }
            }
        }
    }

    fn poll_worker(&mut self) {
        loop {
            match self.worker.try_report() {
                Ok(Some(report)) if Some(report.id) == self.active_pass => {
                    self.active_pass = None;
                    match report.outcome {
                        PassOutcome::Completed(result) => {
                            info!(
                                id = report.id,
                                elapsed_ms = result.elapsed.as_millis(),
                                rows = result.rows_rendered,
                                "Pass complete"
                            );
                            self.state = RenderState::Completed;
                        }
                        PassOutcome::Cancelled(_) => {
                            // Cancelled behind our back; render the view again.
                            warn!(id = report.id, "Pass cancelled externally, relaunching");
                            self.view.set_dirty(true);
                        }
                    }
                }
                Ok(Some(report)) => debug!(id = report.id, "Discarding stale report"),
                Ok(None) => break,
                Err(e) => {
                    if self.active_pass.take().is_some() {
                        error!(%e, "Render worker disconnected");
                        self.state = RenderState::Completed;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSurface {
        presents: usize,
        outlines: usize,
        resized_to: Option<(u32, u32)>,
    }

    impl Surface for CountingSurface {
        fn resize(&mut self, width: u32, height: u32) {
            self.resized_to = Some((width, height));
        }
        fn update(&mut self, _rgba: &[u8], _width: u32, _height: u32) {}
        fn draw(&mut self, _sprite: Sprite) {}
        fn draw_outline(&mut self, _shape: &mandelzoom_core::BoxShape) {
            self.outlines += 1;
        }
        fn clear(&mut self) {}
        fn present(&mut self) {
            self.presents += 1;
        }
    }

    fn controller(w: u32, h: u32) -> Controller<f64> {
        Controller::new(View::home(w, h).unwrap(), Mandelbrot, 2).unwrap()
    }

    fn settle(c: &mut Controller<f64>, s: &mut CountingSurface) {
        for _ in 0..10_000 {
            c.tick(s);
            if c.state() == RenderState::Displayed && !c.needs_redraw() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        panic!("controller never settled");
    }

    #[test]
    fn first_tick_launches_and_sizes_surface() {
        let mut c = controller(16, 12);
        let mut s = CountingSurface::default();
        assert!(c.tick(&mut s));
        assert_eq!(s.resized_to, Some((16, 12)));
        assert!(!c.view().is_dirty());
    }

    #[test]
    fn settled_controller_stops_presenting() {
        let mut c = controller(16, 12);
        let mut s = CountingSurface::default();
        settle(&mut c, &mut s);
        let before = s.presents;
        assert!(!c.tick(&mut s));
        assert!(!c.tick(&mut s));
        assert_eq!(s.presents, before);
    }

    #[test]
    fn reset_returns_home() {
        let mut c = controller(16, 12);
        c.handle_event(InputEvent::Pan { dx: 1.0, dy: -2.0 });
        c.handle_event(InputEvent::Zoom { delta: -3.0 });
        c.handle_event(InputEvent::Reset);
        assert_eq!(*c.view().centre(), Complex::new(-0.5, 0.0));
        assert_eq!(c.view().zoom(), 1.0);
        assert!(c.view().is_dirty());
    }

    #[test]
    fn right_click_cancels_zoom_box() {
        let mut c = controller(40, 30);
        c.handle_event(InputEvent::MouseDown { button: MouseButton::Left, x: 5, y: 5 });
        c.handle_event(InputEvent::MouseMove { x: 25, y: 20 });
        assert!(c.view().zoom_box().is_active());
        c.handle_event(InputEvent::MouseDown { button: MouseButton::Right, x: 25, y: 20 });
        assert!(!c.view().zoom_box().is_active());
        c.handle_event(InputEvent::MouseUp { button: MouseButton::Left, x: 25, y: 20 });
        assert_eq!(*c.view().centre(), Complex::new(-0.5, 0.0));
    }

    #[test]
    fn outline_is_erased_once_after_cancel() {
        let mut c = controller(40, 30);
        let mut s = CountingSurface::default();
        settle(&mut c, &mut s);

        c.handle_event(InputEvent::MouseDown { button: MouseButton::Left, x: 5, y: 5 });
        c.handle_event(InputEvent::MouseMove { x: 25, y: 20 });
        assert!(c.tick(&mut s));
        assert_eq!(s.outlines, 1);

        c.handle_event(InputEvent::MouseDown { button: MouseButton::Right, x: 0, y: 0 });
        assert!(c.tick(&mut s), "box removal must be redrawn");
        assert!(!c.tick(&mut s));
        assert_eq!(s.outlines, 1);
    }

    #[test]
    fn close_requests_exit() {
        let mut c = controller(8, 8);
        let mut s = CountingSurface::default();
        c.tick(&mut s);
        assert_eq!(c.handle_event(InputEvent::Close), EventOutcome::Exit);
    }

    #[test]
    fn zero_resize_is_ignored() {
        let mut c = controller(8, 8);
        c.handle_event(InputEvent::Resize { width: 0, height: 5 });
        assert_eq!(c.view().screen(), ScreenSize { width: 8, height: 8 });
    }

    #[test]
    fn state_labels() {
        assert_eq!(RenderState::Displayed.label(), "Done");
        assert_eq!(RenderState::Completed.label(), "Completed");
    }
}
