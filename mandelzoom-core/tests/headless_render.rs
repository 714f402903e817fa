use mandelzoom_core::{DoubleDouble, Escape, EscapeParams, Fractal, Mandelbrot, Real, View};

/// Evaluate every pixel of a view into a flat, row-major Vec.
fn render_grid<R: Real>(view: &View<R>) -> Vec<Escape> {
    let screen = view.screen();
    let params = EscapeParams::for_zoom(view.zoom());
    let mut results = Vec::with_capacity(screen.pixel_count());
    for y in 0..screen.height as i32 {
        for x in 0..screen.width as i32 {
            results.push(Mandelbrot.escape(&view.complex_at_pixel(x, y), &params));
        }
    }
    results
}

fn count_interior(results: &[Escape]) -> usize {
    results.iter().filter(|e| e.is_interior()).count()
}

#[test]
fn home_view_contains_set_and_exterior() {
    let view = View::<f64>::home(100, 100).unwrap();
    let results = render_grid(&view);

    assert_eq!(results.len(), 100 * 100);
    let interior = count_interior(&results);
    assert!(interior > 0, "should have some interior points");
    assert!(interior < results.len(), "should have some escaped points");
}

#[test]
fn headless_render_is_deterministic() {
    let view = View::<f64>::home(80, 60).unwrap();
    assert_eq!(render_grid(&view), render_grid(&view));
}

#[test]
fn corners_of_home_view_escape_fast() {
    let view = View::<f64>::home(64, 48).unwrap();
    let params = EscapeParams::for_zoom(view.zoom());
    let corner = Mandelbrot.escape(&view.complex_at_pixel(0, 0), &params);
    assert!(matches!(corner, Escape::Escaped { iterations } if iterations < 3));
}

#[test]
fn zoomed_in_view_gets_a_larger_budget() {
    let mut view = View::<f64>::home(40, 30).unwrap();
    let before = EscapeParams::for_zoom(view.zoom()).max_iterations;
    view.zoom_by(-4.0);
    let after = EscapeParams::for_zoom(view.zoom()).max_iterations;
    assert_eq!(after, before + 40);
}

#[test]
fn precisions_agree_on_the_home_view() {
    let fast = View::<f64>::home(48, 36).unwrap();
    let precise = View::<DoubleDouble>::home(48, 36).unwrap();

    let a = render_grid(&fast);
    let b = render_grid(&precise);
    let differing = a.iter().zip(&b).filter(|(x, y)| x != y).count();
    // Points sitting on the boundary may land either side; nothing else should.
    assert!(differing <= a.len() / 100, "{differing} pixels differ");
}
