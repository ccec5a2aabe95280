use crate::Result;
use std::sync::Arc;

/// The smallest unit of work, created from one input line.
///
/// A statement is immutable once created. Blocks and the consumers executing
/// them share it through an [`Arc`], so handing a block to several subscribers
/// never copies statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    text: String,
}

impl Statement {
    /// Wraps the given line text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the source text of the statement.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Dispatches this statement to an [`Executor`].
    pub fn execute(&self, executor: &mut dyn Executor) -> Result<()> {
        executor.execute(self)
    }
}

/// A capability that acts on statements.
///
/// Sinks implement this to decide what "running" a statement means for them,
/// e.g. appending its text to a log line or writing it to a file.
pub trait Executor {
    fn execute(&mut self, statement: &Statement) -> Result<()>;
}

/// Creates shared [`Statement`]s from raw lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementFactory;

impl StatementFactory {
    pub const fn new() -> Self {
        Self
    }

    pub fn create(&self, line: impl Into<String>) -> Arc<Statement> {
        Arc::new(Statement::new(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingExecutor {
        last: String,
    }

    impl Executor for RecordingExecutor {
        fn execute(&mut self, statement: &Statement) -> Result<()> {
            self.last = format!("Statement {{ {} }}", statement.text());
            Ok(())
        }
    }

    #[test]
    fn factory_accepts_empty_and_plain_lines() {
        let factory = StatementFactory::new();
        assert_eq!(factory.create("").text(), "");
        assert_eq!(factory.create("cmd1").text(), "cmd1");
    }

    #[test]
    fn execute_dispatches_to_executor() {
        let statement = StatementFactory::new().create("cmd");
        let mut executor = RecordingExecutor {
            last: String::new(),
        };

        statement.execute(&mut executor).unwrap();
        assert_eq!(executor.last, "Statement { cmd }");
    }
}
