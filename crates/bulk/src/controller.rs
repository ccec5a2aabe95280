use crate::{
    BrokenBlocks, ConsoleSink, Error, FileSink, Markers, PoolSubscriber, Result, RunMetrics,
    Segmenter, Subscriber, WorkerMetrics, WorkerPool,
};
use core::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the console pool in the reference wiring.
pub const LOG_POOL: &str = "log";
/// Name of the file pool in the reference wiring.
pub const FILE_POOL: &str = "file";

/// Settings for [`Controller::reference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceConfig {
    /// Statements per fixed-size block. Must be at least 1.
    pub block_size: usize,
    /// Worker threads in the file pool. Must be at least 1.
    pub workers: usize,
    /// Directory receiving one file per block.
    pub output_dir: PathBuf,
    pub markers: Markers,
}

impl ReferenceConfig {
    pub fn new(block_size: usize, workers: usize) -> Self {
        Self {
            block_size,
            workers,
            output_dir: PathBuf::from("."),
            markers: Markers::default(),
        }
    }
}

/// Wires a [`Segmenter`] to its subscribers and owns the pools it feeds.
///
/// A controller is single-use: [`Controller::run`] consumes it, because the
/// pools it owns are stopped and joined before the run returns.
pub struct Controller {
    segmenter: Segmenter,
    pools: Vec<Arc<WorkerPool>>,
}

impl Controller {
    pub fn new(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            pools: Vec::new(),
        }
    }

    /// Registers a plain subscriber. Registering the same instance twice has
    /// no effect.
    #[must_use]
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscriber>) -> Self {
        self.segmenter.subscribe(subscriber);
        self
    }

    /// Takes ownership of `pool` and subscribes it to the segmenter.
    ///
    /// The pool is stopped and joined at the end of [`Controller::run`], and
    /// its worker metrics appear in the report in registration order.
    #[must_use]
    pub fn with_pool(mut self, pool: WorkerPool, broken_blocks: BrokenBlocks) -> Self {
        let pool = Arc::new(pool);
        self.segmenter
            .subscribe(Arc::new(PoolSubscriber::new(Arc::clone(&pool), broken_blocks)));
        self.pools.push(pool);
        self
    }

    /// Builds the reference wiring: a single-worker console pool that prints
    /// completed blocks to `console`, and a file pool with `config.workers`
    /// workers that persists every block, broken ones included.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for a zero block size or worker count.
    /// - [`Error::Io`] if the output directory cannot be created.
    /// - [`Error::Spawn`] if a worker thread cannot be started.
    pub fn reference<W>(config: &ReferenceConfig, console: W) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        if config.workers == 0 {
            return Err(Error::invalid_config("file pool needs at least one worker"));
        }
        let segmenter = Segmenter::with_markers(config.block_size, config.markers.clone())?;
        let file_sink = FileSink::new(&config.output_dir)?;

        let log = WorkerPool::new(LOG_POOL, 1, ConsoleSink::new(console))?;
        let file = WorkerPool::new(FILE_POOL, config.workers, file_sink)?;

        Ok(Self::new(segmenter)
            .with_pool(log, BrokenBlocks::Discard)
            .with_pool(file, BrokenBlocks::Forward))
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn pools(&self) -> &[Arc<WorkerPool>] {
        &self.pools
    }

    /// Segments `input` to the end, then stops and joins every owned pool.
    ///
    /// All pools are stopped before any is joined, so they drain in parallel.
    /// Shutdown also happens when reading fails; the read error is returned
    /// once every worker has exited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading `input` fails.
    pub fn run<R: BufRead>(mut self, input: R) -> Result<RunReport> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            block_size = self.segmenter.block_size(),
            pools = self.pools.len(),
            "Run started"
        );

        let outcome = self.segmenter.run(input);

        for pool in &self.pools {
            pool.stop();
        }
        let pools = self
            .pools
            .iter()
            .map(|pool| PoolReport {
                name: pool.name().to_owned(),
                workers: pool.join(),
            })
            .collect();

        let run = outcome?;
        let halted = self.segmenter.state().error().map(str::to_owned);

        #[cfg(feature = "tracing")]
        tracing::info!(
            lines = run.lines,
            blocks = run.blocks,
            halted = halted.is_some(),
            "Run finished"
        );

        Ok(RunReport { run, halted, pools })
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("segmenter", &self.segmenter)
            .field("pools", &self.pools.len())
            .finish()
    }
}

/// Worker metrics of one pool after it was joined.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolReport {
    pub name: String,
    pub workers: Vec<WorkerMetrics>,
}

impl PoolReport {
    /// Blocks processed across all workers.
    pub fn blocks(&self) -> u64 {
        self.workers.iter().map(|w| w.blocks).sum()
    }

    pub fn statements(&self) -> u64 {
        self.workers.iter().map(|w| w.statements).sum()
    }

    pub fn failures(&self) -> u64 {
        self.workers.iter().map(|w| w.failures).sum()
    }
}

/// Outcome of [`Controller::run`].
///
/// `halted` carries the diagnostic when a close marker without an open block
/// stopped the run early.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    pub run: RunMetrics,
    pub halted: Option<String>,
    pub pools: Vec<PoolReport>,
}

/// One line per thread:
///
/// ```text
/// main thread - 12 lines, 9 statements, 3 blocks
/// log thread - 3 blocks, 9 statements
/// file-0 thread - 2 blocks, 5 statements
/// file-1 thread - 1 blocks, 4 statements
/// ```
///
/// A single-worker pool is labelled by its name alone.
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "main thread - {} lines, {} statements, {} blocks",
            self.run.lines, self.run.statements, self.run.blocks
        )?;
        if self.run.broken_blocks > 0 {
            write!(f, ", {} broken blocks", self.run.broken_blocks)?;
        }
        writeln!(f)?;

        for pool in &self.pools {
            let single = pool.workers.len() == 1;
            for worker in &pool.workers {
                if single {
                    write!(f, "{} thread", pool.name)?;
                } else {
                    write!(f, "{}-{} thread", pool.name, worker.worker)?;
                }
                write!(f, " - {} blocks, {} statements", worker.blocks, worker.statements)?;
                if worker.failures > 0 {
                    write!(f, ", {} failures", worker.failures)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
