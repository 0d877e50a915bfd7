//! CLI argument definitions for the noble prebuild tool.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::PrebuildConfig;
use camino::Utf8PathBuf;
use clap::Parser;

/// Build and package prebuilt noble addon archives.
#[derive(Parser, Debug, Default)]
#[command(name = "noble-prebuild")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build and package prebuilt noble addon archives.\n\n",
    "For each selected runtime/ABI target, runs the prebuild tool as ",
    "`<tool> -t <abi> -r <runtime>` and packages build/Release/binding.node ",
    "and build/Release/noble.node into a reproducible .tar.gz under ",
    "prebuilds/@<scope>/.\n\n",
    "By default only the first selected target is processed. Use ",
    "--all-targets to process every target.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build and package the first selected target:\n",
    "    $ noble-prebuild\n\n",
    "  Build and package every selected target:\n",
    "    $ noble-prebuild --all-targets\n\n",
    "  Show the selected targets and archive paths:\n",
    "    $ noble-prebuild --dry-run --all-targets\n",
))]
pub struct Cli {
    /// Package root containing package.json and build/ [default: current directory].
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<Utf8PathBuf>,

    /// Configuration file [default: <project-root>/prebuild.toml if present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory receiving archives, overriding the configuration.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Prebuild tool program, overriding the configuration.
    #[arg(long, value_name = "PROGRAM")]
    pub tool: Option<String>,

    /// Scope directory for archives, overriding package.json.
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<String>,

    /// Process every selected target instead of only the first.
    #[arg(long)]
    pub all_targets: bool,

    /// Print the plan and exit without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Print every manifest target and whether it is selected, then exit.
    #[arg(long, conflicts_with = "dry_run")]
    pub list_targets: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// The default `env_logger` filter implied by `-v` and `-q`.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut PrebuildConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(tool) = &self.tool {
            config.tool.clone_from(tool);
        }
        if self.scope.is_some() {
            config.scope.clone_from(&self.scope);
        }
        if self.all_targets {
            config.all_targets = true;
        }
    }
}
