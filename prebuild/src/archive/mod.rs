//! Prebuilt addon archive construction.
//!
//! # Sub-modules
//!
//! - [`builder`] - Writes a deterministic `.tar.gz` atomically.
//! - [`entry`] - Entry name and permission normalization.
//! - [`error`] - Error types for archive construction.

pub mod builder;
pub mod entry;
pub mod error;

pub use builder::{ArchiveBuilder, ArchiveReport, DEFAULT_COMPRESSION_LEVEL};
pub use entry::{BuildArtifactFile, FORCED_MODE_BITS, archive_entry_name, normalized_mode};
pub use error::{ArchiveError, SkippedFile};

/// Build outputs packaged for every target, relative to the project root:
/// the addon and its legacy alias.
pub const KNOWN_ARTIFACTS: &[&str] = &["build/Release/binding.node", "build/Release/noble.node"];
