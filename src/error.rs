use std::{collections::TryReserveError, io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot open archive {path} for writing")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot open or stat {path}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot read {path}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Writing entry {entry_name} to the archive failed")]
    ArchiveWrite {
        entry_name: String,
        #[source]
        source: io::Error,
    },
    #[error("Writing the central directory failed")]
    CentralDirectoryWrite {
        #[source]
        source: io::Error,
    },
    #[error("Cannot walk directory {path}")]
    DirectoryTraversalFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Allocating memory for an entry failed")]
    AllocationFailed {
        #[source]
        source: TryReserveError,
    },
    #[error("Entry name too long (length must fit into 16bit)")]
    TooLongEntryName { entry_name: String },
    #[error("Entry {entry_name} is {size} B, stored entries must be smaller than 4 GiB")]
    EntryTooLarge { entry_name: String, size: u64 },
    #[error("Archive offset {offset} B does not fit into 32bit")]
    ArchiveTooLarge { offset: u64 },
    #[error("Archive already holds {count} entries, the maximum without Zip64")]
    TooManyEntries { count: usize },
    #[error("Entry {entry_name} reports length {expected_size} B, but {actual_size} B were read")]
    LengthMismatch {
        entry_name: String,
        expected_size: u64,
        actual_size: u64,
    },
}
