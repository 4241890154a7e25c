//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unarch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract archive contents
    Extract(ExtractArgs),
    /// List archive contents without extraction
    List(ListArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Remap an entry to a destination (repeatable; an entry may be
    /// mapped several times to duplicate it). Without any mapping every
    /// entry extracts to its own archive path.
    #[arg(long = "map", short = 'm', value_name = "ENTRY=DEST")]
    pub map: Vec<String>,

    /// Archive password (prompted for interactively when omitted and the
    /// archive turns out to be encrypted)
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

/// Splits an `ENTRY=DEST` mapping argument.
pub fn parse_mapping(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((entry, destination)) if !entry.is_empty() && !destination.is_empty() => {
            Ok((entry, destination))
        }
        _ => Err(format!("invalid mapping (expected ENTRY=DEST): {raw}")),
    }
}
