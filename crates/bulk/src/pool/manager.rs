//! Fixed-size pool of worker threads fed by one shared channel.
//!
//! This module defines the [`WorkerPool`] struct, which spawns `N` named OS
//! threads that all receive from the same unbounded
//! [`crossbeam_channel`] channel. Any idle worker may pick up newly queued
//! blocks, so there is no routing and no per-worker queue to balance.
//!
//! Ordering: a single worker processes blocks in the order they were sent.
//! With more than one worker, blocks may complete out of send order.

use super::{Job, worker::worker_loop};
use crate::{Block, Error, Result, WorkerMetrics};
use core::mem;
use crossbeam_channel::{Sender, unbounded};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A named group of worker threads applying one [`Job`] to queued blocks.
///
/// The pool is driven through shared references, so it can be wrapped in an
/// [`Arc`] and fed from a subscriber callback while the owner keeps the
/// handle to stop and join it.
pub struct WorkerPool {
    name: String,
    workers: usize,
    sender: RwLock<Option<Sender<Block>>>,
    handles: Mutex<Vec<(usize, JoinHandle<WorkerMetrics>)>>,
    joined: Mutex<Vec<WorkerMetrics>>,
}

impl WorkerPool {
    /// Spawns `workers` threads named `<name>-<index>` running `job`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `workers` is zero.
    /// - [`Error::Spawn`] if a thread could not be started. Workers spawned
    ///   before the failure are shut down first.
    pub fn new(name: impl Into<String>, workers: usize, job: impl Job) -> Result<Self> {
        let name = name.into();
        if workers == 0 {
            return Err(Error::invalid_config(format!(
                "worker pool `{name}` needs at least one worker"
            )));
        }

        let (tx, rx) = unbounded();
        let job: Arc<dyn Job> = Arc::new(job);
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let rx = rx.clone();
            let job = Arc::clone(&job);
            let spawned = thread::Builder::new()
                .name(format!("{name}-{worker_id}"))
                .spawn(move || worker_loop(worker_id, rx, job));

            match spawned {
                Ok(handle) => handles.push((worker_id, handle)),
                Err(source) => {
                    drop(tx);
                    for (_, handle) in handles {
                        let _ = handle.join();
                    }
                    return Err(Error::Spawn { pool: name, source });
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool `{name}` started with {workers} workers");

        Ok(Self {
            name,
            workers,
            sender: RwLock::new(Some(tx)),
            handles: Mutex::new(handles),
            joined: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of worker threads the pool was started with.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Blocks queued but not yet taken by a worker. Zero once the pool is
    /// stopped.
    pub fn queued(&self) -> usize {
        self.sender.read().as_ref().map_or(0, Sender::len)
    }

    pub fn is_stopped(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Appends `block` to the shared queue and wakes an idle worker.
    ///
    /// Never blocks on the work itself: the queue is unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolStopped`] once [`WorkerPool::stop`] has been
    /// called.
    pub fn send(&self, block: Block) -> Result<()> {
        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            return Err(self.stopped());
        };
        // Workers hold receivers until the sender is dropped, so the channel
        // cannot be disconnected while we still have a sender.
        sender.send(block).map_err(|_| self.stopped())
    }

    /// Closes the queue. Workers finish every block already queued, then exit.
    ///
    /// Calling `stop` more than once has no further effect.
    pub fn stop(&self) {
        if self.sender.write().take().is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker pool `{}` stopping", self.name);
        }
    }

    /// Waits for every worker thread to exit and returns their metrics ordered
    /// by worker index.
    ///
    /// Must be preceded by [`WorkerPool::stop`], otherwise workers keep
    /// waiting for more blocks and this call does not return. Calling `join`
    /// again returns the same metrics.
    pub fn join(&self) -> Vec<WorkerMetrics> {
        let mut joined = self.joined.lock();
        let handles = mem::take(&mut *self.handles.lock());

        for (worker_id, handle) in handles {
            match handle.join() {
                Ok(metrics) => joined.push(metrics),
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Worker {worker_id} of pool `{}` panicked", self.name);
                    joined.push(WorkerMetrics::new(worker_id));
                }
            }
        }

        joined.sort_by_key(|m| m.worker);
        joined.clone()
    }

    fn stopped(&self) -> Error {
        Error::PoolStopped {
            pool: self.name.clone(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

impl core::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("workers", &self.workers)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
