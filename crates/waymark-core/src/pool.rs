//! Bounded worker pool for search jobs.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

/// Failure to start the worker threads.
#[derive(Error, Debug)]
#[error("failed to build worker pool: {0}")]
pub struct PoolError(#[from] rayon::ThreadPoolBuildError);

/// A fixed-size set of worker threads.
///
/// Jobs are fire-and-forget: results travel back through whatever the job
/// captures (typically a [`Dispatcher`](crate::Dispatcher)). Clones share the
/// same threads.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Start a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let threads = threads.max(1);
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("waymark-worker-{i}"))
            .panic_handler(|payload| {
                log::error!("worker job panicked: {}", panic_message(payload.as_ref()));
            })
            .build()?;
        log::info!("worker pool started with {threads} threads");
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Queue `job` on the pool. Never blocks the caller.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.spawn(job);
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.inner.current_num_threads()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}
