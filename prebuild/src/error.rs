//! Error types for the noble prebuild pipeline.
//!
//! Errors in this module terminate the run with a non-zero exit status.
//! Failures that the pipeline recovers from locally, such as a build tool
//! exiting non-zero or a single addon binary being absent, are reported
//! through [`crate::invoker::BuildOutcome`] and
//! [`crate::archive::ArchiveError`] instead.

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a prebuild run.
#[derive(Debug, Error)]
pub enum PrebuildError {
    /// The external build tool could not be started at all.
    #[error("failed to start {program}: {source}; is it installed and on PATH?")]
    Spawn {
        /// Program that failed to launch.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// A runtime name is neither `node` nor `electron`.
    #[error("unknown runtime \"{value}\"; expected node or electron")]
    UnknownRuntime {
        /// The rejected runtime string.
        value: String,
    },

    /// An ABI version of zero was supplied.
    #[error("invalid ABI version {value}; ABI versions are positive integers")]
    InvalidAbi {
        /// The rejected ABI value.
        value: u32,
    },

    /// `package.json` does not exist at the expected location.
    #[error("package.json not found at {path}")]
    PackageManifestNotFound {
        /// Path where the file was expected.
        path: Utf8PathBuf,
    },

    /// `package.json` exists but lacks a usable name or version.
    #[error("invalid package.json at {path}: {reason}")]
    InvalidPackageManifest {
        /// Path to the invalid manifest.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found at {path}")]
    ConfigNotFound {
        /// Path that was requested.
        path: Utf8PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// Path to the invalid configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// No compiled addon was found in any of the searched locations.
    #[error("could not locate {file}; tried: {}", display_paths(.tried))]
    BindingNotFound {
        /// File name being looked up.
        file: String,
        /// Every candidate path that was checked.
        tried: Vec<PathBuf>,
    },

    /// The current platform has no native binding.
    #[error("no native binding is available for platform {platform}")]
    UnsupportedPlatform {
        /// Node-style platform name.
        platform: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using [`PrebuildError`].
pub type Result<T> = std::result::Result<T, PrebuildError>;
