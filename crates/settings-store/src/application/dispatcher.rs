//! Thread-affinity dispatcher: one worker thread that runs every settings
//! write.
//!
//! Callers on any thread hand a job to [`Dispatcher::dispatch`].  If the
//! caller already is the worker the job runs inline; otherwise it is queued
//! and `dispatch` returns immediately.  Jobs run one at a time in submission
//! order.
//!
//! [`Dispatcher::sync`] blocks until every job queued before it has run.
//! Called on the worker itself it returns at once (the worker cannot wait for
//! its own queue).
//!
//! # Why a plain thread? (for beginners)
//!
//! Settings writes are small blocking file operations.  Running them on a
//! dedicated OS thread keeps them off the callers' threads and off any async
//! runtime.  The queue is a Tokio unbounded channel; the worker drains it with
//! `blocking_recv`, which is the synchronous way to read a Tokio channel from
//! outside a runtime.
//!
//! `sync` also waits with a blocking receive and must therefore not be called
//! from inside an async task.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// A unit of work for the worker thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Run(Job),
    Sync(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the settings worker thread.
///
/// Dropping the handle lets the worker finish every queued job and then
/// joins it.
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Command>,
    worker: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(rx))?;
        let worker = handle.thread().id();
        debug!(thread = name, "settings worker started");
        Ok(Self {
            tx,
            worker,
            handle: Some(handle),
        })
    }

    /// Returns `true` when called from the worker thread.
    pub fn is_worker(&self) -> bool {
        thread::current().id() == self.worker
    }

    /// Runs `job` on the worker: inline if already there, queued otherwise.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_worker() {
            run_job(Box::new(job));
            return;
        }
        if self.tx.send(Command::Run(Box::new(job))).is_err() {
            warn!("settings worker has stopped, dropping job");
        }
    }

    /// Blocks until every job submitted before this call has finished.
    pub fn sync(&self) {
        if self.is_worker() {
            return;
        }
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Sync(done_tx)).is_err() {
            warn!("settings worker has stopped, nothing to wait for");
            return;
        }
        // An error means the worker dropped the marker while shutting down.
        let _ = done_rx.blocking_recv();
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if self.is_worker() {
            // Cannot join ourselves; the loop exits on the Shutdown marker.
            return;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("settings worker terminated abnormally");
            }
        }
    }
}

fn worker_loop(mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Run(job) => run_job(job),
            Command::Sync(done) => {
                let _ = done.send(());
            }
            Command::Shutdown => break,
        }
    }
    debug!("settings worker stopped");
}

/// Runs one job, containing a panic so later jobs still run.
fn run_job(job: Job) {
    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
        error!("settings job panicked; continuing with the next job");
    }
}
