use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use mandelzoom_core::{EscapeParams, Fractal, Real, View};

use crate::buffer::PixelBuffer;
use crate::hue::escape_colour;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Tracks the current render generation for cancellation and progress.
///
/// A pass is launched with the generation current at launch time; advancing
/// the generation tells every in-flight row of that pass to stop. The
/// progress counters let the UI show how far the pass has got.
#[derive(Debug)]
pub struct RenderCancel {
    generation: AtomicU64,
    progress_done: AtomicUsize,
    progress_total: AtomicUsize,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            progress_done: AtomicUsize::new(0),
            progress_total: AtomicUsize::new(0),
        }
    }

    /// Cancel the current pass by advancing the generation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Read the current generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// `true` while a pass launched with `generation` should keep going.
    #[inline]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Reset progress for a new pass with `total` rows.
    pub fn reset_progress(&self, total: usize) {
        self.progress_total.store(total, Ordering::Relaxed);
        self.progress_done.store(0, Ordering::Relaxed);
    }

    /// Increment completed rows by one.
    pub fn inc_progress(&self) {
        self.progress_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress_done.load(Ordering::Relaxed),
            self.progress_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Summary of one pass. The pixels themselves live in the buffer the pass
/// was given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderResult {
    pub elapsed: Duration,
    pub rows_rendered: usize,
    pub cancelled: bool,
}

/// Marker used to short-circuit `try_for_each` once a pass is stale.
struct Stale;

// ---------------------------------------------------------------------------
// Full-frame render
// ---------------------------------------------------------------------------

/// Evaluate every pixel of `view` into `buffer`, one row per work item.
///
/// Rows are spread over the current rayon pool. Each row checks `cancel`
/// before it starts, so a cancelled pass stops within one row per thread and
/// leaves the rows it never reached untouched (transparent, if the buffer was
/// cleared beforehand).
pub fn render<R: Real, F: Fractal<R>>(
    fractal: &F,
    view: &View<R>,
    buffer: &PixelBuffer,
    cancel: &RenderCancel,
    generation: u64,
) -> RenderResult {
    let start = Instant::now();
    let screen = view.screen();
    let width = screen.width.min(buffer.width());
    let height = screen.height.min(buffer.height());
    debug_assert_eq!((screen.width, screen.height), (buffer.width(), buffer.height()));

    let params = EscapeParams::for_zoom(view.zoom());
    cancel.reset_progress(height as usize);
    debug!(
        width,
        height,
        max_iter = params.max_iterations,
        generation,
        "Starting render pass"
    );

    let outcome = (0..height).into_par_iter().try_for_each(|y| {
        if !cancel.is_current(generation) {
            return Err(Stale);
        }
        for x in 0..width {
            let z0 = view.complex_at_pixel(x as i32, y as i32);
            let escape = fractal.escape(&z0, &params);
            buffer.store(x, y, escape_colour(escape, params.max_iterations));
        }
        cancel.inc_progress();
        Ok(())
    });

    let cancelled = outcome.is_err() || !cancel.is_current(generation);
    let (rows_rendered, _) = cancel.progress();
    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        rows_rendered,
        cancelled,
        view = %view,
        "Render complete"
    );

    RenderResult {
        elapsed,
        rows_rendered,
        cancelled,
    }
}
