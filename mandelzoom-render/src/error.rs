use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn render worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("render worker is no longer running")]
    WorkerGone,

    #[error(transparent)]
    Core(#[from] mandelzoom_core::CoreError),
}
