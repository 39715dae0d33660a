//! CLI for fetching and verifying webhook media blobs.

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rawmedia_core::config;
use std::path::PathBuf;

pub use args::JobArgs;
use commands::{run_checksum, run_fetch, run_inspect, run_verify};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rawmedia")]
#[command(about = "Fetch and verify encrypted media referenced by webhooks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a blob and fail unless its length matches the webhook's fileLength.
    Fetch {
        #[command(flatten)]
        job: JobArgs,

        /// Also guess the file type from magic bytes.
        #[arg(long)]
        detect: bool,
    },

    /// Download a blob, report the length delta, file type, SHA-256 and MAC result.
    Inspect {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Detect type, hash and check the MAC of a blob already on disk.
    Verify {
        /// Path to the downloaded blob.
        path: PathBuf,

        /// Base64 media key for the MAC check.
        #[arg(long, value_name = "BASE64")]
        media_key: Option<String>,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch { job, detect } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(&cfg, &job, detect)?;
            }
            CliCommand::Inspect { job } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_inspect(&cfg, &job)?;
            }
            CliCommand::Verify { path, media_key } => run_verify(&path, media_key.as_deref())?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
