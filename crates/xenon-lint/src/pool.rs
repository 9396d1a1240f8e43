//! Fixed-width worker pool for line checks.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

const POOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pool");

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs queued jobs on a fixed number of threads.
///
/// Dropping the pool lets queued jobs finish, then joins every worker.
pub(crate) struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn new(width: usize) -> io::Result<Self> {
        let (jobs, receiver) = mpsc::channel::<Job>();
        let shared = Arc::new(Mutex::new(receiver));
        let mut workers = Vec::with_capacity(width);
        for index in 0..width.max(1) {
            let queue = Arc::clone(&shared);
            let worker = thread::Builder::new()
                .name(format!("xenon-lint-{index}"))
                .spawn(move || work(&queue))?;
            workers.push(worker);
        }
        Ok(Self {
            jobs: Some(jobs),
            workers,
        })
    }

    pub(crate) fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let queued = self
            .jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(Box::new(job)).is_ok());
        if !queued {
            debug!(target: POOL_TARGET, "worker pool stopped, job dropped");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.jobs.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                debug!(target: POOL_TARGET, "lint worker exited abnormally");
            }
        }
    }
}

fn work(queue: &Mutex<Receiver<Job>>) {
    loop {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        let Ok(job) = next else {
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!(target: POOL_TARGET, "lint job panicked");
        }
    }
}
