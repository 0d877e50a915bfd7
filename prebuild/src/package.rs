//! `package.json` metadata used to name prebuilt archives.
//!
//! Only `name` and `version` are read. A scoped name such as
//! `@trainerroad/noble` is split so the scope becomes the archive directory
//! and the bare name becomes the archive prefix.

use crate::error::{PrebuildError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
}

/// Name and version of the npm package being prebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Scope without the leading `@`, if the package is scoped.
    pub scope: Option<String>,
    /// Package name without its scope.
    pub name: String,
    /// Package version, as written in `package.json`.
    pub version: String,
}

impl PackageInfo {
    /// Read `package.json` at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PrebuildError::PackageManifestNotFound`] when the file does
    /// not exist, or [`PrebuildError::InvalidPackageManifest`] when it is not
    /// valid JSON or lacks a non-empty `name` or `version`.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PrebuildError::PackageManifestNotFound {
                path: path.to_owned(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|reason| PrebuildError::InvalidPackageManifest {
            path: path.to_owned(),
            reason,
        })
    }

    /// Read `package.json` from a project root directory.
    ///
    /// # Errors
    ///
    /// See [`PackageInfo::load`].
    pub fn load_from_root(project_root: &Utf8Path) -> Result<Self> {
        Self::load(&manifest_path(project_root))
    }

    fn parse(contents: &str) -> std::result::Result<Self, String> {
        let raw: RawPackage = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        let full_name = non_empty(raw.name).ok_or("missing \"name\"")?;
        let version = non_empty(raw.version).ok_or("missing \"version\"")?;
        let (scope, name) = split_scoped_name(&full_name)?;
        Ok(Self {
            scope,
            name,
            version,
        })
    }
}

/// Return the `package.json` path inside `project_root`.
#[must_use]
pub fn manifest_path(project_root: &Utf8Path) -> Utf8PathBuf {
    project_root.join("package.json")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn split_scoped_name(full: &str) -> std::result::Result<(Option<String>, String), String> {
    let Some(scoped) = full.strip_prefix('@') else {
        return Ok((None, full.to_owned()));
    };
    match scoped.split_once('/') {
        Some((scope, name)) if !scope.is_empty() && !name.is_empty() => {
            Ok((Some(scope.to_owned()), name.to_owned()))
        }
        _ => Err(format!("malformed scoped name \"{full}\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temp dir creation succeeds")
    }

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path")
    }

    #[rstest]
    fn loads_scoped_package(temp_dir: TempDir) {
        let root = utf8_root(&temp_dir);
        std::fs::write(
            root.join("package.json"),
            r#"{ "name": "@trainerroad/noble", "version": "1.9.2-21", "main": "index.js" }"#,
        )
        .expect("write package.json");

        let info = PackageInfo::load_from_root(&root).expect("valid package");

        assert_eq!(info.scope.as_deref(), Some("trainerroad"));
        assert_eq!(info.name, "noble");
        assert_eq!(info.version, "1.9.2-21");
    }

    #[test]
    fn unscoped_name_has_no_scope() {
        let info = PackageInfo::parse(r#"{ "name": "noble", "version": "1.0.0" }"#)
            .expect("valid package");
        assert_eq!(info.scope, None);
        assert_eq!(info.name, "noble");
    }

    #[rstest]
    #[case::missing_version(r#"{ "name": "noble" }"#, "version")]
    #[case::blank_name(r#"{ "name": " ", "version": "1.0.0" }"#, "name")]
    #[case::bad_scope(r#"{ "name": "@noble", "version": "1.0.0" }"#, "scoped")]
    #[case::not_json("name = noble", "expected")]
    fn rejects_unusable_manifests(#[case] json: &str, #[case] fragment: &str) {
        let reason = PackageInfo::parse(json).expect_err("invalid manifest");
        assert!(reason.contains(fragment), "unexpected reason: {reason}");
    }

    #[rstest]
    fn missing_file_is_reported_with_its_path(temp_dir: TempDir) {
        let root = utf8_root(&temp_dir);
        let err = PackageInfo::load_from_root(&root).expect_err("no package.json");
        assert!(matches!(
            err,
            PrebuildError::PackageManifestNotFound { path } if path == root.join("package.json")
        ));
    }
}
