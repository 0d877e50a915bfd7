//! Host platform naming in the form Node.js reports it.
//!
//! Prebuilt archives are named after `process.platform` and `process.arch`
//! so that install-time tooling can match them. Rust reports the host via
//! `std::env::consts`, which uses different spellings; this module maps
//! between the two.

use std::fmt;

/// Node-style platform and architecture of a machine.
///
/// # Examples
///
/// ```
/// use noble_prebuild::host::HostPlatform;
///
/// let host = HostPlatform::from_rust("macos", "aarch64");
/// assert_eq!(host.platform(), "darwin");
/// assert_eq!(host.arch(), "arm64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    platform: String,
    arch: String,
}

impl HostPlatform {
    /// Describe the machine this process is running on.
    #[must_use]
    pub fn current() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust `target_os` and `target_arch` names to Node.js names.
    ///
    /// Names without a Node.js counterpart are passed through unchanged.
    #[must_use]
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let platform = match os {
            "macos" => "darwin",
            "windows" => "win32",
            "solaris" => "sunos",
            other => other,
        };
        let node_arch = match arch {
            "x86_64" => "x64",
            "x86" => "ia32",
            "aarch64" => "arm64",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };
        Self::new(platform, node_arch)
    }

    /// Build a host description from Node.js names directly.
    #[must_use]
    pub fn new(platform: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    /// Node.js `process.platform` value.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Node.js `process.arch` value.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}
