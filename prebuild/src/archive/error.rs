//! Error types for archive construction.

use std::path::PathBuf;
use thiserror::Error;

/// A build output that was left out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path that could not be archived.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Errors arising from building a prebuilt archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// None of the expected build outputs could be archived.
    #[error("no build outputs could be archived for {}", .output_path.display())]
    MissingArtifact {
        /// Archive that would have been written.
        output_path: PathBuf,
        /// Every file that was tried, with the reason it was skipped.
        skipped: Vec<SkippedFile>,
    },

    /// Writing the archive itself failed.
    #[error("I/O error while writing archive: {0}")]
    Io(#[from] std::io::Error),

    /// The finished archive could not be moved into place.
    #[error("could not move archive into place at {}: {source}", .output_path.display())]
    Persist {
        /// Final destination of the archive.
        output_path: PathBuf,
        /// The underlying rename error.
        #[source]
        source: std::io::Error,
    },
}
