pub mod complex;
pub mod double_double;
pub mod error;
pub mod fractal;
pub mod geometry;
pub mod mandelbrot;
pub mod real;
pub mod view;
pub mod zoom_box;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use double_double::DoubleDouble;
pub use error::CoreError;
pub use fractal::{Escape, EscapeParams, Fractal};
pub use geometry::{BoxShape, Pixel, Rect, ScreenSize};
pub use mandelbrot::Mandelbrot;
pub use real::Real;
pub use view::View;
pub use zoom_box::ZoomBox;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
