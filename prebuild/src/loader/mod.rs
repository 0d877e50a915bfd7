//! Runtime-side view of the packaged addon.
//!
//! The archives produced by [`crate::pipeline`] carry the `binding.node`
//! that platform loaders open at runtime. This module models that side:
//! which class each platform's addon exports, where the addon is found, and
//! an explicit event subscription interface composed into the addon handle.
//!
//! # Sub-modules
//!
//! - [`binding`] - Platform class selection and addon lookup.
//! - [`events`] - The [`events::EventEmitter`] trait and [`events::EventHub`].

pub mod binding;
pub mod events;

pub use binding::{BINDING_FILE, NativeAddon, PlatformBinding, locate_binding};
pub use events::{EventEmitter, EventHub, Handler, SubscriptionId};
