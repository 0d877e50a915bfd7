//! `prebuild.toml` configuration.
//!
//! Every setting is optional. A missing default file means built-in
//! defaults; values given on the command line take precedence over the file.

use crate::archive::{DEFAULT_COMPRESSION_LEVEL, KNOWN_ARTIFACTS};
use crate::error::{PrebuildError, Result};
use crate::invoker::{DEFAULT_BUILD_TIMEOUT, DEFAULT_TOOL};
use crate::target::{RuntimeRule, TargetFilterPolicy};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "prebuild.toml";

/// Settings for a prebuild run.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PrebuildConfig {
    /// Program that compiles the addon for one target.
    pub tool: String,
    /// Arguments passed to the tool before the target selection.
    pub tool_args: Vec<String>,
    /// Directory receiving archives, relative to the project root.
    pub output_dir: Utf8PathBuf,
    /// Scope directory override; defaults to the `package.json` scope.
    pub scope: Option<String>,
    /// Time limit for one target build, in seconds. Must be at least 1.
    pub build_timeout_secs: u64,
    /// Gzip level, 0–9.
    pub compression_level: u32,
    /// Build every selected target rather than only the first.
    pub all_targets: bool,
    /// Build outputs to package, relative to the project root.
    pub files: Vec<String>,
    /// Target selection rules; a target is built when any rule matches.
    pub rules: Vec<RuntimeRule>,
}

impl Default for PrebuildConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_owned(),
            tool_args: Vec::new(),
            output_dir: Utf8PathBuf::from("prebuilds"),
            scope: None,
            build_timeout_secs: DEFAULT_BUILD_TIMEOUT.as_secs(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            all_targets: false,
            files: KNOWN_ARTIFACTS.iter().map(|&f| f.to_owned()).collect(),
            rules: TargetFilterPolicy::default().rules().to_vec(),
        }
    }
}

impl PrebuildConfig {
    /// Load configuration for `project_root`.
    ///
    /// With `explicit` set, that file must exist. Otherwise
    /// `<project_root>/prebuild.toml` is read when present and defaults are
    /// used when it is not.
    ///
    /// # Errors
    ///
    /// Returns [`PrebuildError::ConfigNotFound`] when an explicit file is
    /// missing, or [`PrebuildError::InvalidConfig`] when the file does not
    /// parse or sets a zero build timeout.
    pub fn load(project_root: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(PrebuildError::ConfigNotFound {
                    path: path.to_owned(),
                });
            }
            Some(path) => path.to_owned(),
            None => {
                let default_path = project_root.join(CONFIG_FILE_NAME);
                if !default_path.is_file() {
                    return Ok(Self::default());
                }
                default_path
            }
        };
        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents).map_err(|reason| PrebuildError::InvalidConfig { path, reason })
    }

    fn parse(contents: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        if config.build_timeout_secs == 0 {
            return Err("build_timeout_secs must be at least 1".to_owned());
        }
        Ok(config)
    }

    /// The target filter described by [`PrebuildConfig::rules`].
    #[must_use]
    pub fn filter_policy(&self) -> TargetFilterPolicy {
        TargetFilterPolicy::new(self.rules.clone())
    }

    /// The build timeout as a [`Duration`].
    #[must_use]
    pub const fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }
}
