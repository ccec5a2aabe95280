//! Thread pool draining delivered blocks off the ingestion thread.
//!
//! A [`WorkerPool`] owns a fixed set of OS threads that share one unbounded
//! MPMC channel of [`Block`]s. Each worker repeatedly takes everything queued
//! at that moment as a private batch and applies the pool's [`Job`] to each
//! block in order. Shutdown is close, then drain, then join: `stop()` closes
//! the channel, workers finish what is already queued, and `join()` collects
//! their [`WorkerMetrics`](crate::WorkerMetrics).
//!
//! ## Structure
//!
//! - [`manager`] - the [`WorkerPool`] handle (send/stop/join).
//! - [`worker`] - the loop each worker thread runs.
//! - [`subscriber`] - adapter registering a pool as a segmenter subscriber.

pub mod manager;
pub mod subscriber;
pub(crate) mod worker;

pub use manager::WorkerPool;
pub use subscriber::{BrokenBlocks, PoolSubscriber};

use crate::{Block, Result};

/// Work applied by a pool to every block it receives.
///
/// A single job instance is shared by all workers of a pool, so it must be
/// thread-safe. Failures are returned, not thrown: the worker logs them,
/// counts them and moves on to the next block.
pub trait Job: Send + Sync + 'static {
    fn run(&self, block: &Block) -> Result<()>;
}

impl<F> Job for F
where
    F: Fn(&Block) -> Result<()> + Send + Sync + 'static,
{
    fn run(&self, block: &Block) -> Result<()> {
        self(block)
    }
}
