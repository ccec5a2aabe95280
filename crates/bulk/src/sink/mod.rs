//! Reference [`Job`](crate::Job)s for delivered blocks.
//!
//! - [`ConsoleSink`] writes one `bulk: a, b, c` line per block.
//! - [`FileSink`] persists each block to its own newly created file.

mod console;
mod file;

pub use console::*;
pub use file::*;
