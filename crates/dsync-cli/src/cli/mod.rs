//! CLI for dsync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use dsync_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_copy, run_man, CopyOverrides};

/// Exit status for bad arguments (clap would otherwise use 2, which is taken
/// by the open-source stage).
pub const USAGE_EXIT: i32 = 1;

/// Top-level CLI for dsync.
#[derive(Debug, Parser)]
#[command(name = "dsync")]
#[command(
    about = "dsync: copy a file onto dCache and verify it against the remote Adler-32",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Copy a local file to a pnfs path and verify the stored checksum.
    Copy {
        /// Local file to copy.
        source: PathBuf,

        /// Destination path on the pnfs mount. Must not exist yet.
        destination: PathBuf,

        /// Append the JSON completion record to this file instead of stdout.
        #[arg(long, value_name = "PATH")]
        record_log: Option<PathBuf>,

        /// Copy block size in bytes.
        #[arg(long, value_name = "BYTES")]
        block_size: Option<usize>,

        /// Seconds between remote size checks.
        #[arg(long, value_name = "SECS")]
        poll_interval: Option<u64>,

        /// Give up waiting for the remote size after this many seconds.
        #[arg(long, value_name = "SECS")]
        max_wait: Option<u64>,

        /// Give up after this many remote size checks.
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,
    },

    /// Compute the Adler-32 of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff).
    Man,
}

/// Parse argv; on error print clap's message and exit (0 for --help/--version).
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { USAGE_EXIT } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = parse_args();

        match cli.command {
            CliCommand::Copy {
                source,
                destination,
                record_log,
                block_size,
                poll_interval,
                max_wait,
                max_attempts,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let overrides = CopyOverrides {
                    record_log,
                    block_size,
                    poll_interval,
                    max_wait,
                    max_attempts,
                };
                run_copy(&cfg, source, destination, overrides).await?;
            }
            CliCommand::Checksum { path } => run_checksum(&path).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
