//! Fixed set of worker threads shared by every request of one verifier.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use thiserror::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("worker pool is shut down")]
    Closed,
}

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers (at least one). Threads live until the pool is
    /// dropped.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("mailprobe-worker-{id}"))
                .spawn(move || {
                    loop {
                        let job = receiver.lock().recv();
                        match job {
                            Ok(job) => {
                                // a panicking job must not take the worker down
                                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                    tracing::warn!(target: "verifier", worker = id, "job panicked");
                                }
                            }
                            Err(_) => break,
                        }
                    }
                })?;
            workers.push(handle);
        }
        tracing::debug!(target: "verifier", size, "worker pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn execute<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;
        sender.send(Box::new(job)).map_err(|_| PoolError::Closed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
