use crate::{Block, Executor, Job, Result, Statement};
use portable_atomic::{AtomicU64, Ordering};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persists every block to a new file, one statement per line.
///
/// Files are named `bulk<unix-micros>-<n>.log`, where `n` comes from a counter
/// owned by this sink. Files are created with `create_new`, so a name clash
/// fails the job instead of overwriting earlier output.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    counter: AtomicU64,
}

impl FileSink {
    /// Creates the sink, creating `dir` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the directory cannot be
    /// created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of file names handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    fn next_path(&self) -> PathBuf {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_micros());
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.dir.join(format!("bulk{micros}-{n}.log"))
    }
}

struct LinesExecutor<'a, W: Write> {
    output: &'a mut W,
}

impl<W: Write> Executor for LinesExecutor<'_, W> {
    fn execute(&mut self, statement: &Statement) -> Result<()> {
        writeln!(self.output, "{}", statement.text())?;
        Ok(())
    }
}

/// Writes `block` through `output`, removing the half-written file at `path`
/// if anything fails.
fn write_or_remove<W: Write>(path: &Path, output: W, block: &Block) -> Result<()> {
    let written = write_lines(output, block);
    if written.is_err() {
        if let Err(_e) = fs::remove_file(path) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to remove partial file {}: {_e}", path.display());
        }
    }
    written
}

fn write_lines<W: Write>(mut output: W, block: &Block) -> Result<()> {
    let mut executor = LinesExecutor {
        output: &mut output,
    };
    for statement in block.iter() {
        statement.execute(&mut executor)?;
    }
    output.flush()?;
    Ok(())
}

impl Job for FileSink {
    fn run(&self, block: &Block) -> Result<()> {
        let path = self.next_path();
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        write_or_remove(&path, BufWriter::new(file), block)?;

        #[cfg(feature = "tracing")]
        tracing::trace!("Wrote {} statements to {}", block.len(), path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatementFactory;

    fn block(lines: &[&str]) -> Block {
        let factory = StatementFactory::new();
        lines.iter().map(|l| factory.create(*l)).collect()
    }

    fn read_all(dir: &Path) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                (name, fs::read_to_string(&path).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn writes_one_file_per_block() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path()).unwrap();

        sink.run(&block(&["cmd1", "cmd2"])).unwrap();
        sink.run(&block(&["cmd3"])).unwrap();

        let files = read_all(temp.path());
        assert_eq!(files.len(), 2);
        assert_eq!(sink.issued(), 2);

        let mut contents: Vec<&str> = files.iter().map(|(_, c)| c.as_str()).collect();
        contents.sort();
        assert_eq!(contents, vec!["cmd1\ncmd2\n", "cmd3\n"]);

        for (name, _) in &files {
            assert!(name.starts_with("bulk"), "{name}");
            assert!(name.ends_with(".log"), "{name}");
        }
    }

    #[test]
    fn names_are_unique_within_the_same_microsecond() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path()).unwrap();

        for _ in 0..200 {
            sink.run(&block(&["x"])).unwrap();
        }
        assert_eq!(read_all(temp.path()).len(), 200);
    }

    #[test]
    fn creates_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("out").join("blocks");
        let sink = FileSink::new(&nested).unwrap();

        sink.run(&block(&["a"])).unwrap();
        assert_eq!(read_all(&nested).len(), 1);
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_removes_the_partial_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bulk1-1.log");
        fs::write(&path, "cmd1\n").unwrap();

        let result = write_or_remove(&path, FullDisk, &block(&["cmd1", "cmd2"]));

        assert!(matches!(result, Err(crate::Error::Io(_))));
        assert!(!path.exists());
        assert!(read_all(temp.path()).is_empty());
    }

    #[test]
    fn successful_write_keeps_the_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bulk1-1.log");
        let file = fs::File::create(&path).unwrap();

        write_or_remove(&path, file, &block(&["cmd1", "cmd2"])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "cmd1\ncmd2\n");
    }

    #[test]
    fn missing_directory_fails_the_job() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("gone");
        let sink = FileSink::new(&dir).unwrap();
        fs::remove_dir(&dir).unwrap();

        assert!(matches!(sink.run(&block(&["a"])), Err(crate::Error::Io(_))));
    }
}
