//! `hapeval`: haptic codec evaluation toolkit.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hapeval", version, about = "Haptic codec evaluation toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full submission process over the configured reference effects
    Submission(commands::submission::SubmissionArgs),

    /// Run the encoder conformance sets
    Conformance {
        /// Evaluation config (JSON)
        config: PathBuf,
    },

    /// Compare two WAV signals and print the PSNR in dB
    Psnr {
        original: PathBuf,
        degraded: PathBuf,
        /// Zero-pad the shorter signal instead of failing on length mismatch
        #[arg(long)]
        autopad: bool,
    },

    /// Print the bitrate of an encoded artifact in kbps
    Bitrate {
        /// Signal the artifact encodes, for its duration
        original: PathBuf,
        encoded: PathBuf,
    },

    /// Verify a data tree against an md5 manifest
    CheckData {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        md5: PathBuf,
    },

    /// Run clang-format over the tracked C++ sources of a repository
    FmtSources {
        /// Repository to format (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Submission(args) => commands::submission::run(args),
        Command::Conformance { config } => commands::conformance::run(&config),
        Command::Psnr {
            original,
            degraded,
            autopad,
        } => commands::psnr::run(&original, &degraded, autopad),
        Command::Bitrate { original, encoded } => commands::bitrate::run(&original, &encoded),
        Command::CheckData { data_dir, md5 } => commands::check_data::run(&data_dir, &md5),
        Command::FmtSources { repo } => commands::fmt_sources::run(&repo),
    }
}
