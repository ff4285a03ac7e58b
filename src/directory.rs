use std::{io::Write, path::Path};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{Archive, Error};

/// Outcome of adding a directory tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    /// Files stored in the archive.
    pub added: usize,
    /// Files and directory entries that were skipped because of an error.
    pub failed: usize,
}

/// Removes a single leading `./` from a path.
fn strip_current_dir_prefix(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}

impl<W: Write> Archive<W> {
    /// Adds every regular file below `root` to the archive, without following symlinks.
    ///
    /// Directories themselves get no entries, symlinks and special files are skipped.
    /// Entry names are the walked paths (`root` joined with the relative path), with a
    /// leading `./` removed.
    ///
    /// Only failing to read `root` itself is an error. Files that cannot be read or
    /// written are logged, counted in the summary and skipped.
    pub fn add_directory<P: AsRef<Path>>(&mut self, root: P) -> Result<TraversalSummary, Error> {
        let root = root.as_ref();
        let mut summary = TraversalSummary::default();

        for dir_entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(source) if source.depth() == 0 => {
                    return Err(Error::DirectoryTraversalFailed {
                        path: root.to_owned(),
                        source,
                    });
                }
                Err(e) => {
                    warn!(
                        error = &e as &(dyn std::error::Error + 'static),
                        "skipping unreadable entry"
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            if !dir_entry.file_type().is_file() {
                continue;
            }

            let path = strip_current_dir_prefix(dir_entry.path());
            match self.add_file(path) {
                Ok(()) => summary.added += 1,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = &e as &(dyn std::error::Error + 'static),
                        "skipping file"
                    );
                    summary.failed += 1;
                }
            }
        }

        debug!(
            root = %root.display(),
            added = summary.added,
            failed = summary.failed,
            "directory added"
        );
        Ok(summary)
    }
}
