//! seqcat - copy one file to standard output through a tuned buffer
//!
//! Standard output carries only file bytes. Logs, diagnostics and the
//! optional transfer summary all go to standard error.

use anyhow::{Context, Result};
use clap::Parser;
use seqcat_io::{CopyOptions, SequentialCopyEngine};
use seqcat_types::{BufferPolicy, BufferSize, CopyStats, Error};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

/// seqcat - sequential file-to-stdout copier
#[derive(Parser)]
#[command(
    name = "seqcat",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy a file to standard output through a tuned I/O buffer",
    long_about = "seqcat reads one file in buffer-sized chunks and writes every chunk in full\n\
                  to standard output. The buffer size and alignment come from a selectable\n\
                  policy: one page, LCM of page and filesystem block size, or a fixed 128KB."
)]
struct Cli {
    /// File to copy to standard output
    file: PathBuf,

    /// Buffer sizing policy
    #[arg(short, long, value_enum, default_value = "fixed")]
    policy: PolicyArg,

    /// Buffer size in bytes, overriding the policy's size
    #[arg(short, long, value_parser = parse_buffer_size)]
    buffer_size: Option<BufferSize>,

    /// Do not advise the kernel about sequential access
    #[arg(long)]
    no_readahead: bool,

    /// Fail on a read interrupted by a signal instead of retrying it
    #[arg(long)]
    no_retry_reads: bool,

    /// Print a transfer summary to standard error when done
    #[arg(long)]
    stats: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - errors only
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum PolicyArg {
    PageSize,
    AlignedPageSize,
    BlockLcm,
    Fixed,
}

impl From<PolicyArg> for BufferPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::PageSize => BufferPolicy::PageSize,
            PolicyArg::AlignedPageSize => BufferPolicy::AlignedPageSize,
            PolicyArg::BlockLcm => BufferPolicy::BlockLcm,
            PolicyArg::Fixed => BufferPolicy::Fixed,
        }
    }
}

fn parse_buffer_size(value: &str) -> std::result::Result<BufferSize, Error> {
    let size: usize = value
        .parse()
        .map_err(|e| Error::config(format!("invalid buffer size '{}': {}", value, e)))?;
    BufferSize::new(size).map_err(Error::config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("seqcat: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    init_logging(cli.debug, cli.quiet, cli.verbose)?;

    info!("seqcat v{} starting", env!("CARGO_PKG_VERSION"));

    let mut options = CopyOptions::new()
        .with_policy(cli.policy.into())
        .read_ahead(!cli.no_readahead)
        .retry_interrupted_reads(!cli.no_retry_reads);
    if let Some(size) = cli.buffer_size {
        options = options.with_buffer_size(size);
    }
    debug!("Copy options: {:?}", options);

    let engine = SequentialCopyEngine::with_options(options);
    let stats = engine.run(&cli.file)?;

    if cli.stats {
        print_copy_stats(&stats);
    }

    Ok(())
}

fn init_logging(debug: bool, quiet: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_new(level).context("invalid log filter")?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")?;

    Ok(())
}

fn print_copy_stats(stats: &CopyStats) {
    eprintln!(
        "seqcat: {} in {} chunks (avg {}), {} policy, {} buffer aligned to {} B, read-ahead {}, {} retries, {} ({:.2} MB/s)",
        format_bytes(stats.bytes_copied),
        stats.chunks,
        format_bytes(stats.avg_chunk_size() as u64),
        stats.policy,
        format_bytes(stats.buffer_size as u64),
        stats.buffer_alignment,
        if stats.readahead_applied { "on" } else { "off" },
        stats.interrupted_retries,
        format_duration(stats.duration),
        stats.transfer_rate() / 1024.0 / 1024.0
    );
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
