//! Main-loop dispatcher for work coming back from background threads.
//!
//! Worker threads never touch editor state directly. They post closures
//! through a [`DispatchHandle`], and the main loop drains the queue once
//! per tick and runs the closures against its own context, in the order
//! they were posted.

use parking_lot::Mutex;
use std::sync::Arc;

/// A unit of work to run on the main thread against context `C`.
pub type MainThreadJob<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Queue of jobs owned by the main loop.
pub struct MainLoopDispatcher<C> {
    queue: Arc<Mutex<Vec<MainThreadJob<C>>>>,
}

/// Cloneable sending side of a [`MainLoopDispatcher`], safe to move to
/// other threads.
pub struct DispatchHandle<C> {
    queue: Arc<Mutex<Vec<MainThreadJob<C>>>>,
}

impl<C> MainLoopDispatcher<C> {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for posting jobs from any thread.
    pub fn handle(&self) -> DispatchHandle<C> {
        DispatchHandle {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Post a job from the main thread itself; it runs on the next drain.
    pub fn post<F>(&self, job: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.queue.lock().push(Box::new(job));
    }

    /// Take every queued job, oldest first.
    ///
    /// The queue is swapped out under the lock, so jobs posted while the
    /// returned batch runs wait for the next drain.
    pub fn drain(&self) -> Vec<MainThreadJob<C>> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Drain and run every queued job against `ctx`. Returns how many ran.
    pub fn run_pending(&self, ctx: &mut C) -> usize {
        let jobs = self.drain();
        let count = jobs.len();
        for job in jobs {
            job(ctx);
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<C> Default for MainLoopDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DispatchHandle<C> {
    /// Queue `job` to run on the main thread.
    pub fn post<F>(&self, job: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.queue.lock().push(Box::new(job));
    }
}

impl<C> Clone for DispatchHandle<C> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}
