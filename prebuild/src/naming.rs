//! Archive naming policy for prebuilt addons.
//!
//! Archives are written to
//! `<output_dir>/@<scope>/<name>-v<version>-<runtime>-v<abi>-<platform>-<arch>.tar.gz`,
//! the layout `prebuild-install` expects when fetching binaries.

use crate::host::HostPlatform;
use crate::package::PackageInfo;
use crate::target::BuildTarget;
use camino::{Utf8Path, Utf8PathBuf};

/// The fixed file extension for prebuilt archives.
const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Computes the output path of each target's archive.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use noble_prebuild::host::HostPlatform;
/// use noble_prebuild::naming::ArchiveNaming;
/// use noble_prebuild::target::{Abi, BuildTarget, Runtime};
///
/// let naming = ArchiveNaming {
///     output_dir: Utf8PathBuf::from("prebuilds"),
///     scope: Some("trainerroad".to_owned()),
///     name: "noble".to_owned(),
///     version: "1.9.2".to_owned(),
///     host: HostPlatform::new("linux", "x64"),
/// };
/// let target = BuildTarget::new(Runtime::Node, Abi::new(108).expect("valid"));
/// assert_eq!(
///     naming.path_for(&target),
///     "prebuilds/@trainerroad/noble-v1.9.2-node-v108-linux-x64.tar.gz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveNaming {
    /// Directory that receives all archives.
    pub output_dir: Utf8PathBuf,
    /// Package scope without `@`; adds a `@<scope>` directory when set.
    pub scope: Option<String>,
    /// Package name without scope.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Platform the archives are built on.
    pub host: HostPlatform,
}

impl ArchiveNaming {
    /// Derive naming from package metadata and the current host.
    #[must_use]
    pub fn for_package(output_dir: Utf8PathBuf, package: &PackageInfo) -> Self {
        Self {
            output_dir,
            scope: package.scope.clone(),
            name: package.name.clone(),
            version: package.version.clone(),
            host: HostPlatform::current(),
        }
    }

    /// Override the scope directory.
    #[must_use]
    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        if scope.is_some() {
            self.scope = scope;
        }
        self
    }

    /// Return the archive file name for `target`.
    #[must_use]
    pub fn file_name(&self, target: &BuildTarget) -> String {
        format!(
            "{}-v{}-{}-v{}-{}-{}{ARCHIVE_EXTENSION}",
            self.name,
            self.version,
            target.runtime,
            target.abi,
            self.host.platform(),
            self.host.arch(),
        )
    }

    /// Return the directory archives are written to.
    #[must_use]
    pub fn archive_dir(&self) -> Utf8PathBuf {
        match &self.scope {
            Some(scope) => self.output_dir.join(format!("@{}", scope.trim_start_matches('@'))),
            None => self.output_dir.clone(),
        }
    }

    /// Return the full output path for `target`.
    #[must_use]
    pub fn path_for(&self, target: &BuildTarget) -> Utf8PathBuf {
        self.archive_dir().join(self.file_name(target))
    }

    /// Resolve the output directory against `root` when it is relative.
    #[must_use]
    pub fn rooted_at(mut self, root: &Utf8Path) -> Self {
        if self.output_dir.is_relative() {
            self.output_dir = root.join(&self.output_dir);
        }
        self
    }
}
