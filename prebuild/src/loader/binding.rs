//! Resolution of the compiled addon a platform loader consumes.
//!
//! The addon exports one class per platform. This module picks that class
//! for the host, finds `binding.node` in the conventional build output
//! locations, and composes an [`EventHub`] into the resulting handle.

use super::events::{EventEmitter, EventHub, Handler, SubscriptionId};
use crate::error::{PrebuildError, Result};
use crate::host::HostPlatform;
use std::path::{Path, PathBuf};

/// File name of the compiled addon.
pub const BINDING_FILE: &str = "binding.node";

/// Directories searched for the addon, relative to the package root, in
/// priority order.
pub const SEARCH_DIRS: &[&str] = &[
    "build",
    "build/Debug",
    "build/Release",
    "out/Debug",
    "Debug",
    "out/Release",
    "Release",
    "build/default",
    "compiled",
    "lib/binding",
];

/// The class a platform's addon exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformBinding {
    /// CoreBluetooth binding on macOS.
    Mac,
    /// WinRT binding on Windows.
    Winrt,
}

impl PlatformBinding {
    /// Select the binding for a Node-style platform name.
    ///
    /// # Errors
    ///
    /// Returns [`PrebuildError::UnsupportedPlatform`] for platforms without
    /// a native binding.
    pub fn for_platform(platform: &str) -> Result<Self> {
        match platform {
            "darwin" => Ok(Self::Mac),
            "win32" => Ok(Self::Winrt),
            other => Err(PrebuildError::UnsupportedPlatform {
                platform: other.to_owned(),
            }),
        }
    }

    /// Select the binding for the running host.
    ///
    /// # Errors
    ///
    /// See [`PlatformBinding::for_platform`].
    pub fn for_host(host: &HostPlatform) -> Result<Self> {
        Self::for_platform(host.platform())
    }

    /// Name of the class exported by the addon.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Mac => "NobleMac",
            Self::Winrt => "NobleWinrt",
        }
    }
}

/// Find `file` under `root` in [`SEARCH_DIRS`] order.
///
/// # Errors
///
/// Returns [`PrebuildError::BindingNotFound`] listing every path tried.
pub fn locate_binding(root: &Path, file: &str) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = SEARCH_DIRS
        .iter()
        .map(|dir| root.join(dir).join(file))
        .collect();
    match candidates.iter().find(|path| path.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(PrebuildError::BindingNotFound {
            file: file.to_owned(),
            tried: candidates,
        }),
    }
}

/// A located platform addon together with its event subscriptions.
#[derive(Debug)]
pub struct NativeAddon<E> {
    binding: PlatformBinding,
    path: PathBuf,
    events: EventHub<E>,
}

impl<E> NativeAddon<E> {
    /// Locate the host's addon under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host has no binding or the addon file is
    /// not found.
    pub fn resolve(root: &Path, host: &HostPlatform) -> Result<Self> {
        let binding = PlatformBinding::for_host(host)?;
        let path = locate_binding(root, BINDING_FILE)?;
        Ok(Self::new(binding, path))
    }

    /// Wrap an already located addon.
    #[must_use]
    pub fn new(binding: PlatformBinding, path: PathBuf) -> Self {
        Self {
            binding,
            path,
            events: EventHub::default(),
        }
    }

    /// The platform class this addon exports.
    #[must_use]
    pub const fn binding(&self) -> PlatformBinding {
        self.binding
    }

    /// Path of the compiled addon.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<E> EventEmitter<E> for NativeAddon<E> {
    fn subscribe(&mut self, event: &str, handler: Handler<E>) -> SubscriptionId {
        self.events.subscribe(event, handler)
    }

    fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool {
        self.events.unsubscribe(event, id)
    }

    fn emit(&mut self, event: &str, payload: &E) -> usize {
        self.events.emit(event, payload)
    }
}
