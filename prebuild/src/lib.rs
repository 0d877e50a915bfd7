//! Noble prebuild library.
//!
//! This crate builds the noble native addon for each supported runtime/ABI
//! target with an external prebuild tool and packages the compiled binaries
//! into reproducible `.tar.gz` archives. It is used by the `noble-prebuild`
//! CLI binary and can be consumed programmatically for testing or custom
//! release workflows.
//!
//! # Modules
//!
//! - [`archive`] - Deterministic, atomic `.tar.gz` construction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `prebuild.toml` loading
//! - [`error`] - Semantic error types
//! - [`host`] - Node-style platform and architecture naming
//! - [`invoker`] - External prebuild tool invocation
//! - [`loader`] - Runtime binding lookup and event subscription
//! - [`naming`] - Archive path policy
//! - [`package`] - `package.json` metadata
//! - [`pipeline`] - Build and packaging orchestration
//! - [`target`] - Runtime/ABI target manifest and filtering

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod invoker;
pub mod loader;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod target;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
