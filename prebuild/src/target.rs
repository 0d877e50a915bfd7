//! Build target enumeration for prebuilt addon archives.
//!
//! A [`BuildTarget`] pairs a JavaScript runtime with the native ABI version
//! that addons must be compiled against. [`MANIFEST`] lists every known
//! combination in a fixed order, and [`enumerate`] filters it through a
//! [`TargetFilterPolicy`] without reordering, so build order is the same on
//! every run.

use crate::error::{PrebuildError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// A runtime that loads native addons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// Node.js.
    Node,
    /// Electron.
    Electron,
}

impl Runtime {
    /// Return the runtime name as passed to the prebuild tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Electron => "electron",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = PrebuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "node" => Ok(Self::Node),
            "electron" => Ok(Self::Electron),
            other => Err(PrebuildError::UnknownRuntime {
                value: other.to_owned(),
            }),
        }
    }
}

/// A native module ABI version.
///
/// ABI versions are positive; zero is rejected at construction time.
///
/// # Examples
///
/// ```
/// use noble_prebuild::target::Abi;
///
/// let abi = Abi::new(108).expect("positive ABI");
/// assert_eq!(abi.get(), 108);
/// assert!(Abi::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Abi(NonZeroU32);

impl Abi {
    /// Create an ABI version, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`PrebuildError::InvalidAbi`] when `value` is zero.
    pub fn new(value: u32) -> Result<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(PrebuildError::InvalidAbi { value })
    }

    /// Return the ABI as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    const fn from_manifest(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl TryFrom<u32> for Abi {
    type Error = PrebuildError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Abi> for u32 {
    fn from(abi: Abi) -> Self {
        abi.get()
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `(runtime, abi)` pair to build and package an addon for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildTarget {
    /// The runtime the addon will be loaded by.
    pub runtime: Runtime,
    /// The ABI version of that runtime.
    pub abi: Abi,
}

impl BuildTarget {
    /// Create a target from a runtime and an ABI.
    #[must_use]
    pub const fn new(runtime: Runtime, abi: Abi) -> Self {
        Self { runtime, abi }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-v{}", self.runtime, self.abi)
    }
}

/// One row of the static target manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The runtime and ABI.
    pub target: BuildTarget,
    /// First runtime release that shipped this ABI.
    pub version: &'static str,
}

const fn entry(runtime: Runtime, abi: u32, version: &'static str) -> ManifestEntry {
    let abi = match NonZeroU32::new(abi) {
        Some(value) => Abi::from_manifest(value),
        None => panic!("manifest ABI versions are non-zero"),
    };
    ManifestEntry {
        target: BuildTarget::new(runtime, abi),
        version,
    }
}

/// Every known runtime/ABI combination, node first, each by ascending
/// release.
pub const MANIFEST: &[ManifestEntry] = &[
    entry(Runtime::Node, 57, "8.0.0"),
    entry(Runtime::Node, 59, "9.0.0"),
    entry(Runtime::Node, 64, "10.0.0"),
    entry(Runtime::Node, 67, "11.0.0"),
    entry(Runtime::Node, 72, "12.0.0"),
    entry(Runtime::Node, 79, "13.0.0"),
    entry(Runtime::Node, 83, "14.0.0"),
    entry(Runtime::Node, 88, "15.0.0"),
    entry(Runtime::Node, 93, "16.0.0"),
    entry(Runtime::Node, 102, "17.0.0"),
    entry(Runtime::Node, 108, "18.0.0"),
    entry(Runtime::Node, 111, "19.0.0"),
    entry(Runtime::Node, 115, "20.0.0"),
    entry(Runtime::Node, 120, "21.0.0"),
    entry(Runtime::Node, 127, "22.0.0"),
    entry(Runtime::Node, 131, "23.0.0"),
    entry(Runtime::Electron, 64, "3.0.0"),
    entry(Runtime::Electron, 69, "4.0.0"),
    entry(Runtime::Electron, 70, "5.0.0"),
    entry(Runtime::Electron, 73, "6.0.0"),
    entry(Runtime::Electron, 75, "7.0.0"),
    entry(Runtime::Electron, 76, "8.0.0"),
    entry(Runtime::Electron, 80, "9.0.0"),
    entry(Runtime::Electron, 82, "10.0.0"),
    entry(Runtime::Electron, 85, "11.0.0"),
    entry(Runtime::Electron, 87, "12.0.0"),
    entry(Runtime::Electron, 89, "13.0.0"),
    entry(Runtime::Electron, 97, "14.0.0"),
    entry(Runtime::Electron, 98, "15.0.0"),
    entry(Runtime::Electron, 99, "16.0.0"),
    entry(Runtime::Electron, 101, "17.0.0"),
    entry(Runtime::Electron, 103, "18.0.0"),
    entry(Runtime::Electron, 106, "19.0.0"),
    entry(Runtime::Electron, 107, "20.0.0"),
    entry(Runtime::Electron, 109, "21.0.0"),
    entry(Runtime::Electron, 110, "22.0.0"),
    entry(Runtime::Electron, 113, "23.0.0"),
    entry(Runtime::Electron, 114, "24.0.0"),
    entry(Runtime::Electron, 116, "25.0.0"),
    entry(Runtime::Electron, 118, "26.0.0"),
    entry(Runtime::Electron, 119, "27.0.0"),
    entry(Runtime::Electron, 121, "28.0.0"),
    entry(Runtime::Electron, 123, "29.0.0"),
    entry(Runtime::Electron, 125, "30.0.0"),
];

/// Selects targets of one runtime at or above a minimum ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeRule {
    /// Runtime this rule applies to.
    pub runtime: Runtime,
    /// Lowest ABI (inclusive) that is selected.
    pub min_abi: u32,
}

impl RuntimeRule {
    /// Create a rule.
    #[must_use]
    pub const fn new(runtime: Runtime, min_abi: u32) -> Self {
        Self { runtime, min_abi }
    }

    /// Whether `target` satisfies this rule.
    #[must_use]
    pub fn matches(&self, target: &BuildTarget) -> bool {
        target.runtime == self.runtime && target.abi.get() >= self.min_abi
    }
}

/// Predicate deciding which manifest targets get built.
///
/// A target is selected when any rule matches it. The default policy
/// selects node ABI 79 and newer, and electron ABI newer than 97.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFilterPolicy {
    rules: Vec<RuntimeRule>,
}

impl TargetFilterPolicy {
    /// Create a policy from explicit rules.
    #[must_use]
    pub const fn new(rules: Vec<RuntimeRule>) -> Self {
        Self { rules }
    }

    /// Return the rules of this policy.
    #[must_use]
    pub fn rules(&self) -> &[RuntimeRule] {
        &self.rules
    }

    /// Whether `target` is selected by this policy.
    #[must_use]
    pub fn matches(&self, target: &BuildTarget) -> bool {
        self.rules.iter().any(|rule| rule.matches(target))
    }
}

impl Default for TargetFilterPolicy {
    fn default() -> Self {
        Self::new(vec![
            RuntimeRule::new(Runtime::Node, 79),
            RuntimeRule::new(Runtime::Electron, 98),
        ])
    }
}

/// Return the targets of `manifest` selected by `policy`, in manifest order.
///
/// # Examples
///
/// ```
/// use noble_prebuild::target::{MANIFEST, TargetFilterPolicy, enumerate};
///
/// let targets = enumerate(MANIFEST, &TargetFilterPolicy::default());
/// assert!(targets.iter().all(|t| t.abi.get() >= 79));
/// ```
#[must_use]
pub fn enumerate(manifest: &[ManifestEntry], policy: &TargetFilterPolicy) -> Vec<BuildTarget> {
    manifest
        .iter()
        .map(|entry| entry.target)
        .filter(|target| policy.matches(target))
        .collect()
}
