//! Main-thread callback dispatch.
//!
//! Worker threads [`enqueue`](Dispatcher::enqueue) completions; the owning
//! thread calls [`drain`](Dispatcher::drain) once per tick and runs them in
//! FIFO order, outside the lock.

use parking_lot::Mutex;

/// A deferred callback, run on the thread that drains the dispatcher.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Thread-safe FIFO of callbacks with a single consumer.
///
/// Create one per application and share it as `Arc<Dispatcher>`.
#[derive(Default)]
pub struct Dispatcher {
    pending: Mutex<Vec<Callback>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Schedule `f` for the next [`drain`](Self::drain). Callable from any thread.
    pub fn enqueue<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pending.lock().push(Box::new(f));
    }

    /// Run every callback queued before this call, in enqueue order.
    ///
    /// The queue is swapped out under the lock and the callbacks run after it
    /// is released, so a callback that enqueues more work lands in the next
    /// drain. Returns the number of callbacks run.
    pub fn drain(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock());
        let n = batch.len();
        for f in batch {
            f();
        }
        n
    }

    /// Number of callbacks waiting for the next drain.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Drop every pending callback without running it (shutdown).
    pub fn clear(&self) {
        let dropped = std::mem::take(&mut *self.pending.lock());
        if !dropped.is_empty() {
            log::debug!("dispatcher cleared {} pending callbacks", dropped.len());
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.len())
            .finish()
    }
}
