use super::Job;
use crate::{Block, WorkerMetrics};
use crossbeam_channel::Receiver;
use std::iter;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Body of a single worker thread.
///
/// Blocks on the shared channel until a block arrives, then takes that block
/// plus whatever else is queued at that moment as a private batch, so the
/// channel is touched once per batch rather than once per block. Blocks within
/// a batch are processed in the order they were enqueued.
///
/// Returns once the channel is closed and empty; the metrics travel back to
/// the pool through the thread's join handle.
///
/// # Arguments
///
/// - `worker_id`: Index of this worker within its pool (used for metrics and
///   logs).
/// - `rx`: Receiving half of the pool's channel.
/// - `job`: The pool's shared job.
pub(crate) fn worker_loop(worker_id: usize, rx: Receiver<Block>, job: Arc<dyn Job>) -> WorkerMetrics {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    let mut metrics = WorkerMetrics::new(worker_id);

    while let Ok(first) = rx.recv() {
        let queued = rx.len();
        let batch: Vec<Block> = iter::once(first).chain(rx.try_iter().take(queued)).collect();

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker {worker_id} took a batch of {} blocks", batch.len());

        for block in &batch {
            process_block(worker_id, job.as_ref(), block, &mut metrics);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        "Worker {worker_id} stopped after {} blocks ({} failed)",
        metrics.blocks,
        metrics.failures
    );

    metrics
}

/// Runs the job on one block. Errors and panics stay inside this function.
fn process_block(_worker_id: usize, job: &dyn Job, block: &Block, metrics: &mut WorkerMetrics) {
    metrics.blocks += 1;
    metrics.statements += block.len() as u64;

    match panic::catch_unwind(AssertUnwindSafe(|| job.run(block))) {
        Ok(Ok(())) => {}
        Ok(Err(_e)) => {
            metrics.failures += 1;
            #[cfg(feature = "tracing")]
            tracing::warn!("Worker {_worker_id} failed to process block: {_e:?}");
        }
        Err(_) => {
            metrics.failures += 1;
            #[cfg(feature = "tracing")]
            tracing::error!("Worker {_worker_id} job panicked; continuing with next block");
        }
    }
}
