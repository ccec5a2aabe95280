use crate::{Block, Executor, Job, Result, Statement};
use parking_lot::Mutex;
use std::io::Write;

/// Prefix of every line written by [`ConsoleSink`].
pub const BULK_PREFIX: &str = "bulk: ";

/// Writes each block as a single `bulk: s1, s2, ...` line.
///
/// The line is rendered before the writer is locked, so concurrent workers
/// never interleave partial lines.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    output: Mutex<W>,
}

impl<W: Write + Send + 'static> ConsoleSink<W> {
    pub fn new(output: W) -> Self {
        Self {
            output: Mutex::new(output),
        }
    }
}

/// Joins statement texts with `", "`.
struct LineExecutor {
    line: String,
    empty: bool,
}

impl Executor for LineExecutor {
    fn execute(&mut self, statement: &Statement) -> Result<()> {
        if !self.empty {
            self.line.push_str(", ");
        }
        self.line.push_str(statement.text());
        self.empty = false;
        Ok(())
    }
}

impl<W: Write + Send + 'static> Job for ConsoleSink<W> {
    fn run(&self, block: &Block) -> Result<()> {
        let mut executor = LineExecutor {
            line: String::from(BULK_PREFIX),
            empty: true,
        };
        for statement in block.iter() {
            statement.execute(&mut executor)?;
        }
        executor.line.push('\n');

        let mut output = self.output.lock();
        output.write_all(executor.line.as_bytes())?;
        output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatementFactory;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn block(lines: &[&str]) -> Block {
        let factory = StatementFactory::new();
        lines.iter().map(|l| factory.create(*l)).collect()
    }

    #[test]
    fn writes_one_line_per_block() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::new(buf.clone());

        sink.run(&block(&["cmd1", "cmd2", "cmd3"])).unwrap();
        sink.run(&block(&["cmd4"])).unwrap();

        let out = String::from_utf8(buf.0.lock().clone()).unwrap();
        assert_eq!(out, "bulk: cmd1, cmd2, cmd3\nbulk: cmd4\n");
    }

    #[test]
    fn write_failure_is_returned() {
        let sink = ConsoleSink::new(Broken);
        assert!(matches!(
            sink.run(&block(&["x"])),
            Err(crate::Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe
        ));
    }
}
