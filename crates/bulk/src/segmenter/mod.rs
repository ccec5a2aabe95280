//! Line-oriented block segmentation.
//!
//! The [`Segmenter`] reads one line at a time and groups statements into
//! blocks using two rules:
//!
//! - **Fixed size**: outside explicit blocks, every `block_size` statements
//!   form a block.
//! - **Explicit blocks**: a line holding only the open marker (`{`) starts a
//!   block that lasts until the matching close marker (`}`). Nested markers
//!   are tracked for balance but do not split the block.
//!
//! Opening an explicit block flushes any partially filled fixed-size block.
//! Reaching the end of input flushes the current block, except inside an
//! explicit block, where the partial block is reported through
//! [`Subscriber::on_unexpected_eof`] instead. A close marker with no open
//! block moves the segmenter into a terminal error state and ends the run.

mod state;

pub use state::*;

use crate::{Block, Error, Registry, Result, RunMetrics, StatementFactory, Subscriber};
use core::mem;
use state::LineKind;
use std::io::BufRead;
use std::sync::Arc;

/// State machine turning an input stream into delivered blocks.
///
/// Configuration is fixed at construction. Each call to [`Segmenter::run`]
/// starts from a clean state, so a segmenter can be reused across streams.
#[derive(Debug)]
pub struct Segmenter {
    block_size: usize,
    markers: Markers,
    factory: StatementFactory,
    subscribers: Registry,
    state: State,
    block: Block,
    metrics: RunMetrics,
}

impl Segmenter {
    /// Creates a segmenter using the default `{` / `}` markers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `block_size` is zero.
    pub fn new(block_size: usize) -> Result<Self> {
        Self::with_markers(block_size, Markers::default())
    }

    /// Creates a segmenter with custom block markers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `block_size` is zero.
    pub fn with_markers(block_size: usize, markers: Markers) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::invalid_config("block size must be greater than 0"));
        }

        Ok(Self {
            block_size,
            markers,
            factory: StatementFactory::new(),
            subscribers: Registry::new(),
            state: State::Initial,
            block: Block::new(),
            metrics: RunMetrics::default(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// State reached by the last run.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Metrics of the last (or current) run.
    pub fn metrics(&self) -> RunMetrics {
        self.metrics
    }

    /// Registers a subscriber. Registering the same instance twice is a no-op.
    ///
    /// Returns `true` if the subscriber was added.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) -> bool {
        self.subscribers.subscribe(subscriber)
    }

    /// Drives the state machine over `input` until it is exhausted or a
    /// grouping error halts the run.
    ///
    /// Counters and any leftover state from a previous run are reset first. A
    /// grouping error is not an `Err`: inspect [`Segmenter::state`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading from `input` fails. Lines that are not
    /// valid UTF-8 are not an error: invalid bytes are replaced with U+FFFD.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(block_size = self.block_size)))]
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<RunMetrics> {
        self.reset();

        let mut buf = Vec::new();
        while self.step(&mut input, &mut buf)? {}

        #[cfg(feature = "tracing")]
        tracing::debug!(
            lines = self.metrics.lines,
            statements = self.metrics.statements,
            blocks = self.metrics.blocks,
            broken_blocks = self.metrics.broken_blocks,
            "Run finished"
        );

        Ok(self.metrics)
    }

    fn reset(&mut self) {
        self.metrics = RunMetrics::default();
        self.block = Block::new();
        self.state = State::Initial;
    }

    /// Processes one line. Returns `false` once the run is over.
    fn step<R: BufRead>(&mut self, input: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
        if let State::Error { message: _message } = &self.state {
            #[cfg(feature = "tracing")]
            tracing::debug!("Halting: {_message}");
            return Ok(false);
        }

        if !read_line(input, buf)? {
            self.finish();
            return Ok(false);
        }
        self.metrics.lines += 1;

        // Bytes that are not UTF-8 become U+FFFD; the line still counts.
        let line = String::from_utf8_lossy(buf);
        let kind = self.markers.classify(&line);
        match (&self.state, kind) {
            (State::Initial, LineKind::Close) => {
                // Anything pending is dropped: nothing is delivered after an
                // error.
                self.block = Block::new();
                self.state = State::Error {
                    message: format!("unexpected end of block at line {}", self.metrics.lines),
                };
            }
            (State::Initial, LineKind::Open) => {
                self.deliver_block();
                self.state = State::InExplicitBlock { depth: 1 };
            }
            (State::Initial, LineKind::Statement) => {
                self.push_statement(&line);
                if self.block.len() >= self.block_size {
                    self.deliver_block();
                }
            }
            (State::InExplicitBlock { depth }, LineKind::Open) => {
                let depth = depth + 1;
                self.state = State::InExplicitBlock { depth };
            }
            (State::InExplicitBlock { depth }, LineKind::Close) => {
                let depth = depth - 1;
                if depth == 0 {
                    self.deliver_block();
                    self.state = State::Initial;
                } else {
                    self.state = State::InExplicitBlock { depth };
                }
            }
            (State::InExplicitBlock { .. }, LineKind::Statement) => {
                self.push_statement(&line);
            }
            (State::Error { .. }, _) => unreachable!("error state is handled above"),
        }

        Ok(true)
    }

    /// End of input.
    fn finish(&mut self) {
        match self.state {
            State::Initial => self.deliver_block(),
            State::InExplicitBlock { .. } => self.deliver_broken_block(),
            State::Error { .. } => {}
        }
    }

    fn push_statement(&mut self, line: &str) {
        self.metrics.statements += 1;
        self.block.push(self.factory.create(line));
    }

    fn deliver_block(&mut self) {
        if self.block.is_empty() {
            return;
        }
        let block = mem::take(&mut self.block);
        self.metrics.blocks += 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(size = block.len(), "Delivering block");

        self.subscribers.notify_block(&block);
    }

    fn deliver_broken_block(&mut self) {
        if self.block.is_empty() {
            return;
        }
        let block = mem::take(&mut self.block);
        self.metrics.broken_blocks += 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(size = block.len(), "Input ended inside an explicit block");

        self.subscribers.notify_unexpected_eof(&block);
    }
}

/// Reads the next line into `buf` without its `\n` or `\r\n` terminator.
///
/// Returns `false` at end of input.
fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}
