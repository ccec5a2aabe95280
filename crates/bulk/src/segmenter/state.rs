use crate::{Error, Result};

/// Default marker opening an explicit block.
pub const DEFAULT_OPEN_MARKER: &str = "{";
/// Default marker closing an explicit block.
pub const DEFAULT_CLOSE_MARKER: &str = "}";

/// Position of the segmenter within the input grammar.
///
/// - [`State::Initial`]: outside any explicit block; lines fill fixed-size
///   blocks.
/// - [`State::InExplicitBlock`]: inside `depth` nested open markers; all
///   lines join one flat block until the outermost close marker.
/// - [`State::Error`]: terminal. A close marker arrived with no open block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum State {
    #[default]
    Initial,
    InExplicitBlock {
        depth: usize,
    },
    Error {
        message: String,
    },
}

impl State {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The diagnostic stored by the error state, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// How a single input line participates in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Open,
    Close,
    Statement,
}

/// Lines that open and close explicit blocks.
///
/// A line is a marker only when its whole trimmed content equals the marker;
/// `echo {` is an ordinary statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    open: String,
    close: String,
}

impl Markers {
    /// Builds a marker pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either marker is blank or both
    /// markers are the same.
    pub fn new(open: impl AsRef<str>, close: impl AsRef<str>) -> Result<Self> {
        let open = open.as_ref().trim();
        let close = close.as_ref().trim();

        if open.is_empty() || close.is_empty() {
            return Err(Error::invalid_config("block markers must not be blank"));
        }
        if open == close {
            return Err(Error::invalid_config(format!(
                "open and close markers must differ (both are `{open}`)"
            )));
        }

        Ok(Self {
            open: open.to_owned(),
            close: close.to_owned(),
        })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub(crate) fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed == self.open {
            LineKind::Open
        } else if trimmed == self.close {
            LineKind::Close
        } else {
            LineKind::Statement
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN_MARKER.to_owned(),
            close: DEFAULT_CLOSE_MARKER.to_owned(),
        }
    }
}
