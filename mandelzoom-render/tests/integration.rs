use mandelzoom_core::{DoubleDouble, Mandelbrot, View};
use mandelzoom_render::{render, PixelBuffer, RenderCancel};

#[test]
fn end_to_end_mandelbrot_render() {
    let view = View::<f64>::home(200, 150).unwrap();
    let buffer = PixelBuffer::new(200, 150);
    let cancel = RenderCancel::new();

    let result = render(&Mandelbrot, &view, &buffer, &cancel, cancel.generation());

    assert!(!result.cancelled);
    assert_eq!(result.rows_rendered, 150);
    assert!(result.elapsed.as_nanos() > 0);

    let pixels = buffer.to_rgba8();
    assert_eq!(pixels.len(), 200 * 150 * 4);
    assert!(pixels.chunks_exact(4).all(|px| px[3] == 0xFF), "every pixel opaque");
    assert!(
        pixels.chunks_exact(4).any(|px| px[0] > 0 || px[1] > 0 || px[2] > 0),
        "rendered image should contain non-black pixels"
    );
    assert!(
        pixels.chunks_exact(4).any(|px| px == [0, 0, 0, 0xFF]),
        "rendered image should contain interior points"
    );
}

#[test]
fn render_determinism() {
    let view = View::<f64>::home(128, 96).unwrap();
    let cancel = RenderCancel::new();
    let a = PixelBuffer::new(128, 96);
    let b = PixelBuffer::new(128, 96);

    render(&Mandelbrot, &view, &a, &cancel, cancel.generation());
    render(&Mandelbrot, &view, &b, &cancel, cancel.generation());

    assert_eq!(a.to_rgba8(), b.to_rgba8(), "renders must be deterministic");
}

#[test]
fn double_double_render_runs_on_a_pool() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let mut view = View::<DoubleDouble>::home(64, 48).unwrap();
    view.zoom_to(-40.0);
    let buffer = PixelBuffer::new(64, 48);
    let cancel = RenderCancel::new();

    let result = pool.install(|| render(&Mandelbrot, &view, &buffer, &cancel, cancel.generation()));

    assert!(!result.cancelled);
    assert!(buffer.to_rgba8().chunks_exact(4).all(|px| px[3] == 0xFF));
}
