#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use bulk::{Controller, RunReport};
use clap::Parser;
use config::{CliArgs, ReportFormat, RunConfig};
use std::io::{self, Write};
use telemetry::init_tracing;

// Using mimalloc for better performance under contention between the console
// and file workers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_tracing();
    log_startup_info(&config);

    let controller = Controller::reference(&config.reference, io::stdout())?;
    let report = controller.run(io::stdin().lock())?;

    write_summary(&mut io::stderr().lock(), &report, config.report)?;

    #[cfg(feature = "tracing")]
    tracing::info!("Shut down cleanly");
    Ok(())
}

/// Writes the halt diagnostic (if any) followed by the report.
fn write_summary<W: Write>(out: &mut W, report: &RunReport, format: ReportFormat) -> anyhow::Result<()> {
    if let Some(message) = &report.halted {
        writeln!(out, "error: {message}")?;
    }
    match format {
        ReportFormat::Text => write!(out, "{report}")?,
        ReportFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(report)?)?,
        ReportFormat::None => {}
    }
    out.flush()?;
    Ok(())
}

fn log_startup_info(_config: &RunConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting with full config: {:#?}", _config);
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting with block size {} and {} file workers",
            _config.reference.block_size,
            _config.reference.workers
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulk::ReferenceConfig;
    use std::io::Cursor;

    fn run(input: &str, format: ReportFormat) -> String {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ReferenceConfig::new(2, 2);
        config.output_dir = dir.path().to_path_buf();

        let report = Controller::reference(&config, io::sink())
            .unwrap()
            .run(Cursor::new(input.to_owned()))
            .unwrap();

        let mut out = Vec::new();
        write_summary(&mut out, &report, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn halt_diagnostic_is_written_once() {
        let out = run("cmd1\ncmd2\ncmd3\n}\ncmd4\n", ReportFormat::None);
        assert_eq!(out, "error: unexpected end of block at line 4\n");
    }

    #[test]
    fn halt_diagnostic_precedes_the_report() {
        let out = run("cmd1\ncmd2\ncmd3\n}\ncmd4\n", ReportFormat::Text);
        let mut lines = out.lines();

        assert_eq!(lines.next(), Some("error: unexpected end of block at line 4"));
        assert_eq!(
            lines.next(),
            Some("main thread - 4 lines, 3 statements, 1 blocks")
        );
        assert_eq!(out.matches("unexpected end of block").count(), 1);
        assert!(!out.lines().any(|l| l.starts_with("bulk: ")));
    }

    #[test]
    fn clean_run_has_no_diagnostic() {
        let out = run("cmd1\ncmd2\n", ReportFormat::Json);
        assert!(!out.contains("error:"));

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["run"]["blocks"], 1);
        assert_eq!(json["halted"], serde_json::Value::Null);
    }
}
