//! Normalized tar entry metadata for build outputs.
//!
//! Entry names are made portable and permission bits are widened so an
//! archive unpacks the same way regardless of the producing machine.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Bits OR'd into every entry mode: world read and world write.
pub const FORCED_MODE_BITS: u32 = 0o444 | 0o222;

/// Normalize a build output path into an archive entry name.
///
/// A leading `build/` is stripped, then path separators become `/` and `:`
/// is replaced with `_`. The prefix is matched before separators are
/// converted, so `build\Release\x.node` keeps its `build/` component.
///
/// # Examples
///
/// ```
/// use noble_prebuild::archive::archive_entry_name;
///
/// assert_eq!(archive_entry_name("build/Release/binding.node"), "Release/binding.node");
/// assert_eq!(archive_entry_name("build\\Release\\noble.node"), "build/Release/noble.node");
/// assert_eq!(archive_entry_name("C:\\out\\a.node"), "C_/out/a.node");
/// ```
#[must_use]
pub fn archive_entry_name(path: &str) -> String {
    let relative = path.strip_prefix("build/").unwrap_or(path);
    relative.replace('\\', "/").replace(':', "_")
}

/// Apply [`FORCED_MODE_BITS`] to a source mode, dropping file type bits.
#[must_use]
pub const fn normalized_mode(source_mode: u32) -> u32 {
    (source_mode & 0o7777) | FORCED_MODE_BITS
}

/// A build output file as it will appear in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifactFile {
    /// Where the file was read from.
    pub source_path: PathBuf,
    /// Name of the tar entry.
    pub archive_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Normalized permission bits written to the entry.
    pub mode: u32,
    /// Owner id copied from the source file.
    pub uid: u64,
    /// Group id copied from the source file.
    pub gid: u64,
}

impl BuildArtifactFile {
    /// Describe `source_path` from its metadata, naming it after `display_path`.
    #[must_use]
    pub fn from_metadata(source_path: &Path, display_path: &str, metadata: &Metadata) -> Self {
        let (mode, uid, gid) = ownership(metadata);
        Self {
            source_path: source_path.to_path_buf(),
            archive_name: archive_entry_name(display_path),
            size: metadata.len(),
            mode: normalized_mode(mode),
            uid,
            gid,
        }
    }

    /// Build the deterministic ustar header for this entry.
    ///
    /// The modification time is fixed at zero so identical inputs produce
    /// identical archives.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry name cannot be encoded in a tar header.
    pub fn header(&self) -> std::io::Result<tar::Header> {
        let mut header = tar::Header::new_ustar();
        header.set_path(&self.archive_name)?;
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(self.size);
        header.set_mode(self.mode);
        header.set_uid(self.uid);
        header.set_gid(self.gid);
        header.set_mtime(0);
        header.set_cksum();
        Ok(header)
    }
}

#[cfg(unix)]
fn ownership(metadata: &Metadata) -> (u32, u64, u64) {
    use std::os::unix::fs::MetadataExt;

    (
        metadata.mode(),
        u64::from(metadata.uid()),
        u64::from(metadata.gid()),
    )
}

#[cfg(not(unix))]
fn ownership(metadata: &Metadata) -> (u32, u64, u64) {
    // No Unix permission bits here; record a conventional file mode.
    let mode = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    (mode, 0, 0)
}
