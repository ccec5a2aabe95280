/// Counters for one full run of the segmenter.
///
/// - `lines`: every line read, including blank and marker lines.
/// - `statements`: every line turned into a statement (anything that is not a
///   marker).
/// - `blocks`: completed blocks delivered through `on_block`.
/// - `broken_blocks`: partial blocks delivered through `on_unexpected_eof`.
///   These are kept apart from `blocks` so a truncated explicit block is never
///   mistaken for a completed one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunMetrics {
    pub lines: u64,
    pub statements: u64,
    pub blocks: u64,
    pub broken_blocks: u64,
}

/// Counters owned by a single pool worker.
///
/// A worker updates these on its own thread and hands them back through its
/// join handle, so no synchronization is needed to read them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerMetrics {
    pub worker: usize,
    pub blocks: u64,
    pub statements: u64,
    pub failures: u64,
}

impl WorkerMetrics {
    pub const fn new(worker: usize) -> Self {
        Self {
            worker,
            blocks: 0,
            statements: 0,
            failures: 0,
        }
    }
}
