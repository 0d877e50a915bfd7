//! Build and packaging pipeline orchestration.
//!
//! For each selected target the pipeline runs the external build, then
//! packages whatever the build left in `build/Release/`. Targets are handled
//! strictly one after another because every build writes to the same output
//! directory. A failed build or archive is logged and recorded in that
//! target's [`TargetReport`]; only a build tool that cannot be started
//! aborts the run.

use crate::archive::{ArchiveBuilder, ArchiveError, ArchiveReport, DEFAULT_COMPRESSION_LEVEL};
use crate::error::Result;
use crate::invoker::{BuildInvoker, BuildOutcome};
use crate::naming::ArchiveNaming;
use crate::target::BuildTarget;
use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info, warn};

/// Which of the enumerated targets a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPolicy {
    /// Process only the first target, whatever its outcome.
    #[default]
    FirstOnly,
    /// Process every target in order.
    All,
}

impl TargetPolicy {
    /// Select the policy from an "all targets" flag.
    #[must_use]
    pub const fn from_all_targets(all: bool) -> Self {
        if all { Self::All } else { Self::FirstOnly }
    }
}

/// Outcome of building and packaging one target.
#[derive(Debug)]
pub struct TargetReport {
    /// The target processed.
    pub target: BuildTarget,
    /// How the build tool exited.
    pub build: BuildOutcome,
    /// The archive written, or why none was.
    pub archive: std::result::Result<ArchiveReport, ArchiveError>,
}

impl TargetReport {
    /// Whether an archive was written for this target.
    #[must_use]
    pub const fn archived(&self) -> bool {
        self.archive.is_ok()
    }
}

/// Settings shared by every target in a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory the build runs in and build outputs are read from.
    pub project_root: Utf8PathBuf,
    /// Archive naming policy.
    pub naming: ArchiveNaming,
    /// Build outputs to package, relative to the project root.
    pub files: Vec<String>,
    /// Which targets to process.
    pub target_policy: TargetPolicy,
    /// Gzip level, 0–9.
    pub compression_level: u32,
}

impl PipelineSettings {
    /// Settings with the default file list, policy and compression.
    #[must_use]
    pub fn new(project_root: Utf8PathBuf, naming: ArchiveNaming) -> Self {
        Self {
            project_root,
            naming,
            files: crate::archive::KNOWN_ARTIFACTS
                .iter()
                .map(|&f| f.to_owned())
                .collect(),
            target_policy: TargetPolicy::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// A target and the archive path it will be packaged to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTarget {
    /// The target.
    pub target: BuildTarget,
    /// Destination archive.
    pub output_path: Utf8PathBuf,
}

/// Drives the build tool and archive builder across targets.
pub struct Pipeline<'a> {
    invoker: &'a dyn BuildInvoker,
    settings: PipelineSettings,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline that builds with `invoker`.
    #[must_use]
    pub fn new(invoker: &'a dyn BuildInvoker, settings: PipelineSettings) -> Self {
        Self { invoker, settings }
    }

    /// Return the pipeline settings.
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Return the targets this pipeline will process, in order.
    #[must_use]
    pub fn selected<'t>(&self, targets: &'t [BuildTarget]) -> &'t [BuildTarget] {
        match self.settings.target_policy {
            TargetPolicy::All => targets,
            TargetPolicy::FirstOnly => targets.get(..1).unwrap_or(targets),
        }
    }

    /// Describe what [`Pipeline::run`] would do without doing it.
    #[must_use]
    pub fn plan(&self, targets: &[BuildTarget]) -> Vec<PlannedTarget> {
        self.selected(targets)
            .iter()
            .map(|target| PlannedTarget {
                target: *target,
                output_path: self.settings.naming.path_for(target),
            })
            .collect()
    }

    /// Build and package the selected targets.
    ///
    /// # Errors
    ///
    /// Returns an error only if the build tool cannot be started. Build and
    /// archive failures are recorded in the returned reports.
    pub fn run(&self, targets: &[BuildTarget]) -> Result<Vec<TargetReport>> {
        let selected = self.selected(targets);
        if selected.len() < targets.len() {
            info!(
                "processing the first of {} targets; enable all targets to build the rest",
                targets.len()
            );
        }

        let mut reports = Vec::with_capacity(selected.len());
        for target in selected {
            reports.push(self.process(target)?);
        }
        Ok(reports)
    }

    fn process(&self, target: &BuildTarget) -> Result<TargetReport> {
        info!("prebuilding {} {}", target.runtime, target.abi);
        let build = self.invoker.invoke(target)?;
        if !build.status.is_success() {
            warn!(
                "build for {target} ended with {}; packaging whatever it produced",
                build.status
            );
        }

        let output_path = self.settings.naming.path_for(target);
        let archive = self.package(&output_path);
        match &archive {
            Ok(report) => info!(
                "wrote {} with {} entr{}",
                report.output_path.display(),
                report.entries.len(),
                if report.entries.len() == 1 { "y" } else { "ies" }
            ),
            Err(err) => error!("packaging {target} failed: {err}"),
        }

        Ok(TargetReport {
            target: *target,
            build,
            archive,
        })
    }

    fn package(&self, output_path: &Utf8Path) -> std::result::Result<ArchiveReport, ArchiveError> {
        ArchiveBuilder::new(output_path.as_std_path())
            .with_level(self.settings.compression_level)
            .build(self.settings.project_root.as_std_path(), &self.settings.files)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
