//! Behaviour-driven tests for the build and packaging pipeline.
//!
//! The external build tool is replaced by `StubInvoker`, which writes fake
//! addon binaries into the project so packaging runs against real files.

use camino::Utf8PathBuf;
use noble_prebuild::archive::ArchiveError;
use noble_prebuild::host::HostPlatform;
use noble_prebuild::invoker::BuildStatus;
use noble_prebuild::naming::ArchiveNaming;
use noble_prebuild::package::PackageInfo;
use noble_prebuild::pipeline::{Pipeline, PipelineSettings, TargetPolicy, TargetReport};
use noble_prebuild::target::{Abi, BuildTarget, Runtime};
use noble_prebuild::test_utils::StubInvoker;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct PipelineWorld {
    _temp_dir: TempDir,
    root: Utf8PathBuf,
    outputs: Vec<String>,
    status: BuildStatus,
    policy: TargetPolicy,
    naming: Option<ArchiveNaming>,
    invoked: usize,
    reports: Vec<TargetReport>,
}

#[fixture]
fn world() -> PipelineWorld {
    let temp_dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).expect("utf8 temp path");
    PipelineWorld {
        _temp_dir: temp_dir,
        root,
        outputs: Vec::new(),
        status: BuildStatus::Exited(0),
        policy: TargetPolicy::FirstOnly,
        naming: None,
        invoked: 0,
        reports: Vec::new(),
    }
}

fn parse_target(text: &str) -> BuildTarget {
    let (runtime, abi) = text.trim().split_once("-v").expect("target like node-v108");
    BuildTarget::new(
        runtime.parse::<Runtime>().expect("known runtime"),
        Abi::new(abi.parse().expect("numeric ABI")).expect("valid ABI"),
    )
}

fn naming(world: &PipelineWorld) -> &ArchiveNaming {
    world.naming.as_ref().expect("package step ran")
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a package \"{name}\" at version \"{version}\"")]
fn given_package(world: &mut PipelineWorld, name: String, version: String) {
    let manifest = serde_json::json!({ "name": name, "version": version });
    fs::write(world.root.join("package.json"), manifest.to_string()).expect("write package.json");
    let package = PackageInfo::load_from_root(&world.root).expect("package.json loads");
    let naming = ArchiveNaming {
        host: HostPlatform::new("linux", "x64"),
        ..ArchiveNaming::for_package(Utf8PathBuf::from("prebuilds"), &package)
    };
    world.naming = Some(naming.rooted_at(&world.root));
}

#[given("a build tool that writes \"{output}\"")]
fn given_tool_output(world: &mut PipelineWorld, output: String) {
    world.outputs.push(output);
}

#[given("a build tool that writes nothing")]
fn given_tool_writes_nothing(world: &mut PipelineWorld) {
    world.outputs.clear();
}

#[given("the build tool exits with status {code}")]
fn given_tool_status(world: &mut PipelineWorld, code: i32) {
    world.status = BuildStatus::Exited(code);
}

#[given("all targets are enabled")]
fn given_all_targets(world: &mut PipelineWorld) {
    world.policy = TargetPolicy::All;
}

#[when("the pipeline runs for \"{targets}\"")]
fn when_pipeline_runs(world: &mut PipelineWorld, targets: String) {
    let targets: Vec<BuildTarget> = targets.split(',').map(parse_target).collect();
    let invoker = StubInvoker::new(world.root.as_std_path(), world.outputs.clone(), world.status);
    let settings = PipelineSettings {
        target_policy: world.policy,
        ..PipelineSettings::new(world.root.clone(), naming(world).clone())
    };

    let reports = Pipeline::new(&invoker, settings)
        .run(&targets)
        .expect("stub build always starts");

    world.invoked = invoker.calls().len();
    world.reports = reports;
}

#[then("the number of builds invoked is {count}")]
fn then_builds_invoked(world: &mut PipelineWorld, count: usize) {
    assert_eq!(world.invoked, count);
    assert_eq!(world.reports.len(), count);
}

#[then("an archive exists for \"{target}\"")]
fn then_archive_exists(world: &mut PipelineWorld, target: String) {
    let path = naming(world).path_for(&parse_target(&target));
    assert!(path.is_file(), "expected archive at {path}");
    assert!(
        path.as_str().contains("@trainerroad"),
        "archive should live under the scope directory: {path}"
    );
}

#[then("no archive exists for \"{target}\"")]
fn then_no_archive(world: &mut PipelineWorld, target: String) {
    let path = naming(world).path_for(&parse_target(&target));
    assert!(!path.exists(), "unexpected archive at {path}");
}

#[then("the report for \"{target}\" records a missing artifact")]
fn then_report_missing(world: &mut PipelineWorld, target: String) {
    let target = parse_target(&target);
    let report = world
        .reports
        .iter()
        .find(|r| r.target == target)
        .expect("report for target");
    assert!(matches!(
        report.archive,
        Err(ArchiveError::MissingArtifact { .. })
    ));
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/prebuild_pipeline.feature",
    name = "Only the first target is processed by default"
)]
fn scenario_first_only(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/prebuild_pipeline.feature",
    name = "Every target is processed when all targets are enabled"
)]
fn scenario_all_targets(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/prebuild_pipeline.feature",
    name = "A failing build is still packaged"
)]
fn scenario_failing_build(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/prebuild_pipeline.feature",
    name = "A build that leaves no outputs produces no archive"
)]
fn scenario_no_outputs(world: PipelineWorld) {
    let _ = world;
}
