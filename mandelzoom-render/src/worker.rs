use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use mandelzoom_core::{Fractal, Real, View};

use crate::buffer::PixelBuffer;
use crate::error::RenderError;
use crate::renderer::{render, RenderCancel, RenderResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One pass: render `view` into `buffer` unless `generation` goes stale.
pub struct RenderJob<R: Real> {
    pub id: u64,
    pub generation: u64,
    pub view: View<R>,
    pub buffer: Arc<PixelBuffer>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassOutcome {
    Completed(RenderResult),
    Cancelled(RenderResult),
}

/// The worker's answer to a [`RenderJob`]. Exactly one is sent per job, after
/// the worker has released its handle on the job's buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    pub id: u64,
    pub outcome: PassOutcome,
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// A dedicated render thread owning its own rayon pool.
///
/// Jobs are processed one at a time in submission order. Dropping the worker
/// cancels the running pass and joins the thread.
pub struct RenderWorker<R: Real> {
    tx_job: Option<mpsc::Sender<RenderJob<R>>>,
    rx_report: mpsc::Receiver<PassReport>,
    cancel: Arc<RenderCancel>,
    handle: Option<JoinHandle<()>>,
}

impl<R: Real> RenderWorker<R> {
    /// Start the worker thread. `threads == 0` sizes the pool to the number of
    /// logical cores.
    pub fn spawn<F: Fractal<R> + 'static>(fractal: F, threads: usize) -> crate::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("render-{i}"))
            .build()?;
        debug!(threads = pool.current_num_threads(), "Render pool ready");

        let (tx_job, rx_job) = mpsc::channel::<RenderJob<R>>();
        let (tx_report, rx_report) = mpsc::channel();
        let cancel = Arc::new(RenderCancel::new());

        let worker_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("render-worker".into())
            .spawn(move || {
                while let Ok(job) = rx_job.recv() {
                    let report = run_job(&fractal, &pool, &worker_cancel, job);
                    if tx_report.send(report).is_err() {
                        return;
                    }
                }
                debug!("Render worker exiting");
            })
            .map_err(RenderError::WorkerSpawn)?;

        Ok(Self {
            tx_job: Some(tx_job),
            rx_report,
            cancel,
            handle: Some(handle),
        })
    }

    /// Shared cancellation and progress state.
    pub fn cancel(&self) -> &Arc<RenderCancel> {
        &self.cancel
    }

    pub fn launch(&self, job: RenderJob<R>) -> crate::Result<()> {
        let tx = self.tx_job.as_ref().ok_or(RenderError::WorkerGone)?;
        tx.send(job).map_err(|_| RenderError::WorkerGone)
    }

    /// Next report if one is waiting.
    pub fn try_report(&self) -> crate::Result<Option<PassReport>> {
        match self.rx_report.try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(RenderError::WorkerGone),
        }
    }

    /// Block until the next report arrives.
    pub fn wait_report(&self) -> crate::Result<PassReport> {
        self.rx_report.recv().map_err(|_| RenderError::WorkerGone)
    }
}

impl<R: Real> Drop for RenderWorker<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.tx_job.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Render worker panicked");
            }
        }
    }
}

fn run_job<R: Real, F: Fractal<R>>(
    fractal: &F,
    pool: &rayon::ThreadPool,
    cancel: &RenderCancel,
    job: RenderJob<R>,
) -> PassReport {
    let RenderJob {
        id,
        generation,
        view,
        buffer,
    } = job;
    debug!(id, generation, "Pass started");

    let result = pool.install(|| render(fractal, &view, &buffer, cancel, generation));
    // Release the buffer before acknowledging so the controller is the sole
    // owner again once it sees the report.
    drop(buffer);

    let outcome = if result.cancelled {
        debug!(id, rows = result.rows_rendered, "Pass cancelled");
        PassOutcome::Cancelled(result)
    } else {
        PassOutcome::Completed(result)
    };
    PassReport { id, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandelzoom_core::Mandelbrot;

    fn job(worker: &RenderWorker<f64>, id: u64, buffer: &Arc<PixelBuffer>) -> RenderJob<f64> {
        RenderJob {
            id,
            generation: worker.cancel().generation(),
            view: View::home(buffer.width(), buffer.height()).unwrap(),
            buffer: Arc::clone(buffer),
        }
    }

    #[test]
    fn completes_a_job_and_releases_the_buffer() {
        let worker = RenderWorker::spawn(Mandelbrot, 2).unwrap();
        let buffer = Arc::new(PixelBuffer::new(24, 16));

        worker.launch(job(&worker, 7, &buffer)).unwrap();
        let report = worker.wait_report().unwrap();

        assert_eq!(report.id, 7);
        assert!(matches!(report.outcome, PassOutcome::Completed(r) if r.rows_rendered == 16));
        assert_eq!(Arc::strong_count(&buffer), 1);
    }

    #[test]
    fn stale_job_is_acknowledged_as_cancelled() {
        let worker = RenderWorker::spawn(Mandelbrot, 1).unwrap();
        let buffer = Arc::new(PixelBuffer::new(8, 8));

        let stale = job(&worker, 1, &buffer);
        worker.cancel().cancel();
        worker.launch(stale).unwrap();

        let report = worker.wait_report().unwrap();
        assert_eq!(report.id, 1);
        assert!(matches!(report.outcome, PassOutcome::Cancelled(_)));
    }

    #[test]
    fn one_report_per_job_in_order() {
        let worker = RenderWorker::spawn(Mandelbrot, 0).unwrap();
        let buffer = Arc::new(PixelBuffer::new(8, 8));
        for id in 0..3 {
            worker.launch(job(&worker, id, &buffer)).unwrap();
        }
        let ids: Vec<u64> = (0..3).map(|_| worker.wait_report().unwrap().id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(worker.try_report().unwrap().is_none());
    }
}
