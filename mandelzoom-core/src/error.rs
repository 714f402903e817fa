use thiserror::Error;

/// Errors raised while constructing core values.
///
/// Operations on an existing [`View`](crate::View) are total and never fail;
/// only construction validates its inputs.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid screen size: {width}×{height} (both sides must be > 0)")]
    InvalidScreenSize { width: u32, height: u32 },

    #[error("invalid zoom: {0} (scale 2^zoom must be finite and positive)")]
    InvalidZoom(f64),

    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),
}
