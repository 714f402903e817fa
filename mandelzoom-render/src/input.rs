//! Windowing-agnostic input events understood by the [`Controller`].
//!
//! [`Controller`]: crate::Controller

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One user action, already normalised by the windowing layer.
///
/// Pixel coordinates are in surface pixels with `(0, 0)` at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pan by a fraction of the view scale (`move_by`).
    Pan { dx: f64, dy: f64 },
    /// Change the zoom exponent; negative zooms in.
    Zoom { delta: f64 },
    /// Return to the home view.
    Reset,
    MouseDown { button: MouseButton, x: i32, y: i32 },
    MouseMove { x: i32, y: i32 },
    MouseUp { button: MouseButton, x: i32, y: i32 },
    /// Abandon an active zoom box without zooming.
    CancelZoomBox,
    Resize { width: u32, height: u32 },
    Close,
}

/// Whether the event loop should keep running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    Exit,
}
