use anyhow::{Context, bail};
use bulk::{DEFAULT_CLOSE_MARKER, DEFAULT_OPEN_MARKER, Markers, ReferenceConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the `bulk` binary.
///
/// Every argument can also be supplied through the environment (or a `.env`
/// file in the working directory); explicit arguments win.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bulk",
    version,
    about = "Groups commands read from stdin into blocks, printing each block and saving it to its own file"
)]
pub struct CliArgs {
    /// Number of commands in a fixed-size block.
    ///
    /// Commands between a `{` line and its matching `}` line always form a
    /// single block, whatever its size.
    ///
    /// Environment variable: `BULK_BLOCK_SIZE`
    #[arg(env = "BULK_BLOCK_SIZE")]
    pub block_size: usize,

    /// Number of threads writing block files.
    ///
    /// Environment variable: `BULK_WORKERS`
    #[arg(env = "BULK_WORKERS", default_value_t = 2)]
    pub workers: usize,

    /// Directory receiving one `bulk<micros>-<n>.log` file per block.
    ///
    /// Created if missing.
    ///
    /// Environment variable: `BULK_OUTPUT_DIR`
    #[arg(long, env = "BULK_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Line that opens an explicit block.
    ///
    /// Environment variable: `BULK_OPEN_MARKER`
    #[arg(long, env = "BULK_OPEN_MARKER", default_value_t = String::from(DEFAULT_OPEN_MARKER))]
    pub open_marker: String,

    /// Line that closes an explicit block.
    ///
    /// Environment variable: `BULK_CLOSE_MARKER`
    #[arg(long, env = "BULK_CLOSE_MARKER", default_value_t = String::from(DEFAULT_CLOSE_MARKER))]
    pub close_marker: String,

    /// Summary printed to stderr once the input is exhausted.
    ///
    /// Environment variable: `BULK_REPORT`
    #[arg(long, value_enum, env = "BULK_REPORT", default_value_t = ReportFormat::Text)]
    pub report: ReportFormat,
}

#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One line per thread.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// No summary.
    None,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub reference: ReferenceConfig,
    pub report: ReportFormat,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.block_size == 0 {
            bail!("BULK_BLOCK_SIZE must be greater than 0");
        }

        if args.workers == 0 {
            bail!("BULK_WORKERS must be greater than 0");
        }

        let markers = Markers::new(&args.open_marker, &args.close_marker).with_context(|| {
            format!(
                "Invalid block markers `{}` / `{}`",
                args.open_marker, args.close_marker
            )
        })?;

        Ok(Self {
            reference: ReferenceConfig {
                block_size: args.block_size,
                workers: args.workers,
                output_dir: args.output_dir,
                markers,
            },
            report: args.report,
        })
    }
}
