use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "stowzip")]
#[command(version)]
#[command(about = "Packs files into a stored (uncompressed) zip archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  stowzip out.zip a.txt b.txt     store two files\n  \
  stowzip -r out.zip .            store everything below the current directory")]
pub struct Cli {
    /// Recurse into directories
    #[arg(short = 'r')]
    pub recursive: bool,

    /// Only report errors
    #[arg(short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// More log output (-vv => trace)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Archive to create, an existing file is overwritten
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Files (and with -r directories) to store
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,
}

impl Cli {
    /// Most verbose level logged when `RUST_LOG` is not set.
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
