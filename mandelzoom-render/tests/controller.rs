use std::thread;
use std::time::{Duration, Instant};

use mandelzoom_core::{BoxShape, Complex, Escape, EscapeParams, Fractal, Mandelbrot, View};
use mandelzoom_render::{
    render, Controller, InputEvent, MouseButton, PixelBuffer, RenderCancel, RenderState, Sprite,
    Surface,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Resize(u32, u32),
    Update(usize),
    Draw(Sprite),
    Outline(BoxShape),
    Clear,
    Present,
}

/// Records every call and keeps the most recently uploaded image.
#[derive(Default)]
struct RecordingSurface {
    calls: Vec<Call>,
    last_upload: Vec<u8>,
}

impl RecordingSurface {
    fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Resize(width, height));
    }
    fn update(&mut self, rgba: &[u8], width: u32, height: u32) {
        assert_eq!(rgba.len(), width as usize * height as usize * 4);
        self.last_upload.clear();
        self.last_upload.extend_from_slice(rgba);
        self.calls.push(Call::Update(rgba.len()));
    }
    fn draw(&mut self, sprite: Sprite) {
        self.calls.push(Call::Draw(sprite));
    }
    fn draw_outline(&mut self, shape: &BoxShape) {
        self.calls.push(Call::Outline(*shape));
    }
    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }
    fn present(&mut self) {
        self.calls.push(Call::Present);
    }
}

/// Mandelbrot that takes its time, so a pass can be caught mid-flight.
struct SlowMandelbrot(Duration);

impl Fractal<f64> for SlowMandelbrot {
    fn escape(&self, z0: &Complex<f64>, params: &EscapeParams) -> Escape {
        thread::sleep(self.0);
        Mandelbrot.escape(z0, params)
    }
}

/// Tick until the finished frame is on screen. Returns how many frames were
/// promoted on the way.
fn settle<F>(c: &mut Controller<f64, F>, s: &mut RecordingSurface) -> u64 {
    let deadline = Instant::now() + Duration::from_secs(60);
    let before = c.frames_displayed();
    loop {
        c.tick(s);
        if !c.needs_redraw() {
            return c.frames_displayed() - before;
        }
        assert!(Instant::now() < deadline, "controller never settled");
        thread::sleep(Duration::from_millis(1));
    }
}

fn reference_frame(view: &View<f64>) -> Vec<u8> {
    let screen = view.screen();
    let buffer = PixelBuffer::new(screen.width, screen.height);
    let cancel = RenderCancel::new();
    render(&Mandelbrot, view, &buffer, &cancel, cancel.generation());
    buffer.to_rgba8()
}

fn home_controller(w: u32, h: u32) -> Controller<f64> {
    Controller::new(View::home(w, h).unwrap(), Mandelbrot, 2).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn dirty_view_reaches_displayed_exactly_once() {
    let mut c = home_controller(32, 24);
    let mut s = RecordingSurface::default();

    assert_eq!(settle(&mut c, &mut s), 1);
    assert_eq!(c.state(), RenderState::Displayed);

    // Nothing more to do until the view changes.
    s.take();
    for _ in 0..5 {
        assert!(!c.tick(&mut s));
    }
    assert!(s.calls.is_empty());
}

#[test]
fn completed_frame_is_the_last_detailed_draw() {
    let mut c = home_controller(32, 24);
    let mut s = RecordingSurface::default();
    settle(&mut c, &mut s);

    let completed = c.completed_rgba();
    assert_eq!(s.last_upload, completed);
    assert_eq!(completed, reference_frame(c.view()));
    assert_eq!(c.completed_view().centre(), c.view().centre());
}

#[test]
fn dirty_tick_presents_rough_frame_before_launching() {
    let mut c = home_controller(16, 12);
    let mut s = RecordingSurface::default();
    c.tick(&mut s);

    let calls = s.take();
    assert_eq!(calls[0], Call::Resize(16, 12));
    assert_eq!(
        &calls[1..5],
        &[
            Call::Clear,
            Call::Update(16 * 12 * 4),
            Call::Draw(Sprite::IDENTITY),
            Call::Present
        ]
    );
}

#[test]
fn rough_draw_follows_a_pan() {
    let mut c = home_controller(32, 24);
    let mut s = RecordingSurface::default();
    settle(&mut c, &mut s);
    s.take();

    // Half a scale to the right moves the old frame a quarter height left.
    c.handle_event(InputEvent::Pan { dx: 0.5, dy: 0.0 });
    c.tick(&mut s);

    let first_draw = s.take().into_iter().find_map(|call| match call {
        Call::Draw(sprite) => Some(sprite),
        _ => None,
    });
    assert_eq!(
        first_draw,
        Some(Sprite {
            x: -6.0,
            y: 0.0,
            scale: 1.0
        })
    );
}

#[test]
fn rough_draw_follows_a_zoom() {
    let mut c = home_controller(32, 24);
    let mut s = RecordingSurface::default();
    settle(&mut c, &mut s);
    s.take();

    c.handle_event(InputEvent::Zoom { delta: -1.0 });
    c.tick(&mut s);

    let first_draw = s.take().into_iter().find_map(|call| match call {
        Call::Draw(sprite) => Some(sprite),
        _ => None,
    });
    assert_eq!(
        first_draw,
        Some(Sprite {
            x: -16.0,
            y: -12.0,
            scale: 2.0
        })
    );
}

#[test]
fn change_during_rendering_cancels_and_relaunches() {
    let slow = SlowMandelbrot(Duration::from_micros(200));
    let mut c = Controller::new(View::home(48, 36).unwrap(), slow, 2).unwrap();
    let mut s = RecordingSurface::default();

    c.tick(&mut s);
    thread::sleep(Duration::from_millis(30));
    c.tick(&mut s);
    assert_eq!(c.state(), RenderState::Rendering);
    let (done, total) = c.progress();
    assert!(done < total, "pass should still be running ({done}/{total})");

    c.handle_event(InputEvent::Pan { dx: 0.25, dy: -0.25 });
    assert_eq!(settle(&mut c, &mut s), 1);

    // Only the relaunched pass for the final view made it to the finished frame.
    let final_view = c.view().clone();
    assert_eq!(*final_view.centre(), Complex::new(0.0, -0.5));
    assert_eq!(c.completed_rgba(), reference_frame(&final_view));
}

#[test]
fn resize_reallocates_and_rerenders() {
    let mut c = home_controller(32, 24);
    let mut s = RecordingSurface::default();
    settle(&mut c, &mut s);
    let centre = c.view().centre().clone();

    c.handle_event(InputEvent::Resize {
        width: 48,
        height: 36,
    });
    assert!(c.view().is_dirty());
    assert_eq!(c.completed_view().screen(), c.view().screen());

    s.take();
    settle(&mut c, &mut s);
    assert_eq!(s.calls.first(), Some(&Call::Resize(48, 36)));
    assert_eq!(*c.view().centre(), centre);
    assert_eq!(c.completed_rgba().len(), 48 * 36 * 4);
    assert_eq!(c.completed_rgba(), reference_frame(c.view()));
}

#[test]
fn zoom_box_drag_zooms_into_the_selection() {
    let mut c = home_controller(40, 30);
    let mut s = RecordingSurface::default();
    settle(&mut c, &mut s);
    let zoom_before = c.view().zoom();

    c.handle_event(InputEvent::MouseDown {
        button: MouseButton::Left,
        x: 10,
        y: 10,
    });
    c.handle_event(InputEvent::MouseMove { x: 30, y: 25 });
    s.take();
    c.tick(&mut s);
    let calls = s.take();
    assert!(calls.iter().any(|call| matches!(call, Call::Outline(_))));
    assert_eq!(calls.last(), Some(&Call::Present));

    c.handle_event(InputEvent::MouseUp {
        button: MouseButton::Left,
        x: 30,
        y: 25,
    });
    assert!(c.view().is_dirty());
    assert!(!c.view().zoom_box().is_active());
    assert!(c.view().zoom() < zoom_before);

    settle(&mut c, &mut s);
    assert_eq!(c.completed_rgba(), reference_frame(c.view()));
}
