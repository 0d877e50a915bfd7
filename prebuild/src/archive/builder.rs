//! Deterministic `.tar.gz` construction for addon build outputs.
//!
//! Files are appended one at a time in the order given. A file that cannot
//! be read is skipped, but an archive with no entries at all is refused.
//! The archive is written to a temporary file beside its destination and
//! renamed into place once the tar trailer and gzip footer are flushed, so
//! a partially written archive is never visible at the output path.

use super::entry::BuildArtifactFile;
use super::error::{ArchiveError, SkippedFile};
use flate2::{Compression, GzBuilder};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Maximum gzip level, used unless overridden.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// Summary of a successfully written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Where the archive was written.
    pub output_path: PathBuf,
    /// Entries written, in archive order.
    pub entries: Vec<BuildArtifactFile>,
    /// Inputs that were left out.
    pub skipped: Vec<SkippedFile>,
}

/// Writes one prebuilt archive.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    output_path: PathBuf,
    level: Compression,
}

impl ArchiveBuilder {
    /// Create a builder targeting `output_path` at maximum compression.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            level: Compression::new(DEFAULT_COMPRESSION_LEVEL),
        }
    }

    /// Use gzip `level` (clamped to 0–9).
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Compression::new(level.min(DEFAULT_COMPRESSION_LEVEL));
        self
    }

    /// Return the destination path.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Archive `files`, each given relative to `root`.
    ///
    /// Entry names are derived from the relative paths with
    /// [`super::archive_entry_name`]. Files that cannot be stat'ed or read,
    /// or whose names cannot be encoded in a tar header, are recorded in
    /// [`ArchiveReport::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MissingArtifact`] if no file could be
    /// archived, in which case nothing is written at the output path.
    /// Returns [`ArchiveError::Io`] or [`ArchiveError::Persist`] if the
    /// archive itself cannot be written.
    pub fn build<S: AsRef<str>>(
        &self,
        root: &Path,
        files: &[S],
    ) -> Result<ArchiveReport, ArchiveError> {
        info!("packaging {}", self.output_path.display());
        let parent = destination_dir(&self.output_path);
        fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        let encoder = GzBuilder::new().mtime(0).write(temp, self.level);
        let mut archive = tar::Builder::new(encoder);

        let mut entries = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();

        for file in files {
            let relative = file.as_ref();
            match read_artifact(root, relative) {
                Ok((artifact, header, contents)) => {
                    archive.append(&header, contents.as_slice())?;
                    debug!(
                        "added {} ({} bytes, mode {:o})",
                        artifact.archive_name, artifact.size, artifact.mode
                    );
                    entries.push(artifact);
                }
                Err(skip) => {
                    warn!("skipping {}: {}", skip.path.display(), skip.reason);
                    skipped.push(skip);
                }
            }
        }

        if entries.is_empty() {
            return Err(ArchiveError::MissingArtifact {
                output_path: self.output_path.clone(),
                skipped,
            });
        }

        let encoder = archive.into_inner()?;
        let temp = encoder.finish()?;
        temp.as_file().sync_all()?;
        set_archive_permissions(temp.path())?;
        temp.persist(&self.output_path)
            .map_err(|err| ArchiveError::Persist {
                output_path: self.output_path.clone(),
                source: err.error,
            })?;

        Ok(ArchiveReport {
            output_path: self.output_path.clone(),
            entries,
            skipped,
        })
    }
}

fn destination_dir(output_path: &Path) -> &Path {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Stat and read one input completely and encode its header.
///
/// Everything that can fail for this file alone happens here, before any
/// bytes reach the tar stream, so a bad input never leaves a partial entry.
fn read_artifact(
    root: &Path,
    relative: &str,
) -> Result<(BuildArtifactFile, tar::Header, Vec<u8>), SkippedFile> {
    let source = root.join(relative);
    let skip = |err: std::io::Error| SkippedFile {
        path: source.clone(),
        reason: err.to_string(),
    };

    let metadata = fs::metadata(&source).map_err(skip)?;
    let contents = fs::read(&source).map_err(skip)?;
    let mut artifact = BuildArtifactFile::from_metadata(&source, relative, &metadata);
    artifact.size = contents.len() as u64;
    let header = artifact.header().map_err(skip)?;
    Ok((artifact, header, contents))
}

#[cfg(unix)]
fn set_archive_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_archive_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
