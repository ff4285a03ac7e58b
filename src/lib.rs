//! Writer for stored (uncompressed) zip archives.
//!
//! Files are appended to the output as they are added, the central directory is
//! written by [`Archive::finalize`]. No compression, encryption or Zip64.
//!
//! ```no_run
//! # fn main() -> Result<(), stowzip::Error> {
//! let mut archive = stowzip::Archive::create("out.zip")?;
//! archive.add_file("Cargo.toml")?;
//! archive.add_directory("src")?;
//! archive.finalize()?;
//! # Ok(())
//! # }
//! ```

mod archive;
pub mod cli;
mod counting_writer;
mod crc_reader;
mod directory;
pub mod dos_time;
mod error;
pub mod logging;
mod structs;
#[cfg(test)]
mod test_util;

pub use archive::{Archive, PendingEntry};
pub use directory::TraversalSummary;
pub use dos_time::DosDatetime;
pub use error::Error;
