//! # bulk
//!
//! Groups a stream of text commands into blocks and hands every block to
//! concurrent consumers.
//!
//! Each input line is a statement. Outside explicit blocks, statements are
//! grouped into fixed-size blocks of `block_size`. A line holding only `{`
//! opens an explicit block that lasts until the matching `}`, however many
//! statements it holds; nested braces are tracked but do not split it.
//!
//! ## Pipeline
//!
//! - [`Segmenter`] reads lines and notifies [`Subscriber`]s synchronously.
//! - [`WorkerPool`] runs a [`Job`] on its own threads; a [`PoolSubscriber`]
//!   hands blocks from the segmenter to a pool without waiting.
//! - [`ConsoleSink`] and [`FileSink`] are the two stock jobs.
//! - [`Controller`] wires everything, drives the run, shuts the pools down and
//!   returns a [`RunReport`].
//!
//! ## Example
//!
//! ```
//! use bulk::{Block, BrokenBlocks, Controller, Segmenter, WorkerPool};
//! use std::io::Cursor;
//!
//! let pool = WorkerPool::new("print", 1, |block: &Block| -> bulk::Result<()> {
//!     println!("bulk: {block}");
//!     Ok(())
//! })?;
//!
//! let report = Controller::new(Segmenter::new(2)?)
//!     .with_pool(pool, BrokenBlocks::Forward)
//!     .run(Cursor::new("a\nb\n{\nc\nd\ne\n}\n"))?;
//!
//! assert_eq!(report.run.blocks, 2);
//! assert_eq!(report.pools[0].statements(), 5);
//! # Ok::<(), bulk::Error>(())
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): log events through the `tracing` crate.
//! - `serde`: serialize metrics and run reports.

mod block;
mod controller;
mod error;
mod metrics;
mod pool;
mod segmenter;
mod sink;
mod statement;
mod subscription;

pub use crate::block::*;
pub use crate::controller::*;
pub use crate::error::*;
pub use crate::metrics::*;
pub use crate::pool::{BrokenBlocks, Job, PoolSubscriber, WorkerPool};
pub use crate::segmenter::*;
pub use crate::sink::*;
pub use crate::statement::*;
pub use crate::subscription::*;
