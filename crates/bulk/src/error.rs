//! Error types for block segmentation and dispatch.
//!
//! This module defines the central [`Error`] enum, which captures every
//! reportable failure in the crate. An unmatched close marker is not one of
//! them: it moves the segmenter into its terminal error state and shows up in
//! the run report.
//!
//! ## Error Cases
//! - `InvalidConfig`: A block size, worker count or marker was rejected at
//!   construction time.
//! - `PoolStopped`: A block was sent to a worker pool after `stop()`.
//! - `Spawn`: The operating system refused to start a worker thread.
//! - `Job`: A job function could not handle a block.
//! - `Io`: Reading input or writing output failed.

use std::io;
use thiserror::Error;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the `bulk` crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A constructor argument was out of range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The pool no longer accepts work.
    #[error("Worker pool `{pool}` is stopped")]
    PoolStopped { pool: String },

    /// A worker thread could not be spawned.
    #[error("Failed to spawn worker for pool `{pool}`")]
    Spawn {
        pool: String,
        #[source]
        source: io::Error,
    },

    /// A job rejected the block it was given.
    #[error("Job failed: {reason}")]
    Job { reason: String },

    /// Underlying input or output failure.
    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
