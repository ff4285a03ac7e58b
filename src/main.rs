use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use stowzip::{cli::Cli, logging, Archive};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level());

    let mut archive = Archive::create(&cli.archive)
        .with_context(|| format!("Failed to create {}", cli.archive.display()))?;

    for input in &cli.inputs {
        add_input(&mut archive, input, cli.recursive)?;
    }

    archive
        .finalize()
        .with_context(|| format!("Failed to finalize {}", cli.archive.display()))?;

    Ok(())
}

/// Adds one command line argument to the archive.
///
/// Directories are walked only when recursing. Individual files failing inside
/// a walked directory are reported but don't stop the archive.
fn add_input(archive: &mut Archive<fs::File>, input: &Path, recursive: bool) -> Result<()> {
    let is_dir = fs::metadata(input).is_ok_and(|metadata| metadata.is_dir());

    if !is_dir {
        return archive
            .add_file(input)
            .with_context(|| format!("Failed to add {}", input.display()));
    }

    if !recursive {
        info!(path = %input.display(), "skipping directory, use -r to include it");
        return Ok(());
    }

    let summary = archive
        .add_directory(input)
        .with_context(|| format!("Failed to walk {}", input.display()))?;
    if summary.failed > 0 {
        warn!(
            path = %input.display(),
            failed = summary.failed,
            "some entries of the directory were skipped"
        );
    }
    Ok(())
}
