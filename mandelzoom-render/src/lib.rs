pub mod buffer;
pub mod controller;
pub mod error;
pub mod hue;
pub mod input;
pub mod renderer;
pub mod surface;
pub mod worker;

pub use buffer::PixelBuffer;
pub use controller::{Controller, RenderState};
pub use error::RenderError;
pub use hue::{escape_colour, hue_to_rgb};
pub use input::{EventOutcome, InputEvent, MouseButton};
pub use renderer::{render, RenderCancel, RenderResult};
pub use surface::{Sprite, Surface};
pub use worker::{PassOutcome, PassReport, RenderJob, RenderWorker};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
