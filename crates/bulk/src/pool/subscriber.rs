use super::WorkerPool;
use crate::{Block, Subscriber};
use std::sync::Arc;

/// What a [`PoolSubscriber`] does with blocks cut short by end of input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BrokenBlocks {
    /// Enqueue them like any other block (best-effort output).
    #[default]
    Forward,
    /// Drop them; only completed blocks reach the pool.
    Discard,
}

/// Registers a [`WorkerPool`] as a segmenter [`Subscriber`].
///
/// Callbacks clone the block (statements are shared, not copied) and enqueue
/// it, returning without waiting for the job to run.
#[derive(Debug, Clone)]
pub struct PoolSubscriber {
    pool: Arc<WorkerPool>,
    broken_blocks: BrokenBlocks,
}

impl PoolSubscriber {
    pub const fn new(pool: Arc<WorkerPool>, broken_blocks: BrokenBlocks) -> Self {
        Self {
            pool,
            broken_blocks,
        }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    fn enqueue(&self, block: &Block) {
        if let Err(_e) = self.pool.send(block.clone()) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Dropping block of {} statements: {_e}", block.len());
        }
    }
}

impl Subscriber for PoolSubscriber {
    fn on_block(&self, block: &Block) {
        self.enqueue(block);
    }

    fn on_unexpected_eof(&self, block: &Block) {
        match self.broken_blocks {
            BrokenBlocks::Forward => self.enqueue(block),
            BrokenBlocks::Discard => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Pool `{}` discards broken block of {} statements",
                    self.pool.name(),
                    block.len()
                );
            }
        }
    }
}
