//! Behaviour-driven tests for prebuilt archive packaging.
//!
//! Tests use the rstest-bdd v0.5.0 mutable world pattern.

use flate2::read::GzDecoder;
use noble_prebuild::archive::{ArchiveBuilder, ArchiveError, ArchiveReport, KNOWN_ARTIFACTS};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ArchiveWorld {
    temp_dir: Option<TempDir>,
    report: Option<ArchiveReport>,
    error: Option<ArchiveError>,
    first_archive: Option<Vec<u8>>,
}

#[fixture]
fn world() -> ArchiveWorld {
    ArchiveWorld {
        temp_dir: Some(TempDir::new().expect("temp dir")),
        ..ArchiveWorld::default()
    }
}

fn temp_path(world: &ArchiveWorld) -> PathBuf {
    world
        .temp_dir
        .as_ref()
        .expect("temp_dir set")
        .path()
        .to_path_buf()
}

fn archive_path(world: &ArchiveWorld) -> PathBuf {
    temp_path(world).join("prebuilds/noble-v1.0.0-node-v108-linux-x64.tar.gz")
}

fn package(world: &ArchiveWorld) -> Result<ArchiveReport, ArchiveError> {
    ArchiveBuilder::new(archive_path(world)).build(&temp_path(world), KNOWN_ARTIFACTS)
}

/// Entry names and headers of the written archive, in order.
fn read_entries(world: &ArchiveWorld) -> Vec<(String, u64, u32)> {
    let file = fs::File::open(archive_path(world)).expect("open archive");
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .expect("entries")
        .map(|e| {
            let entry = e.expect("entry");
            let name = entry.path().expect("path").to_string_lossy().into_owned();
            let header = entry.header();
            (
                name,
                header.size().expect("size"),
                header.mode().expect("mode"),
            )
        })
        .collect()
}

fn find_entry(world: &ArchiveWorld, name: &str) -> (String, u64, u32) {
    read_entries(world)
        .into_iter()
        .find(|(entry, _, _)| entry == name)
        .unwrap_or_else(|| panic!("entry {name} not in archive"))
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a build output \"{path}\" of {size} bytes")]
fn given_build_output(world: &mut ArchiveWorld, path: String, size: usize) {
    let full = temp_path(world).join(&path);
    fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
    fs::write(&full, vec![0xA5_u8; size]).expect("write output");
}

#[when("the build outputs are packaged")]
fn when_packaged(world: &mut ArchiveWorld) {
    match package(world) {
        Ok(report) => world.report = Some(report),
        Err(err) => world.error = Some(err),
    }
}

#[when("the build outputs are packaged twice")]
fn when_packaged_twice(world: &mut ArchiveWorld) {
    world.report = Some(package(world).expect("first packaging"));
    let first = fs::read(archive_path(world)).expect("read first archive");
    package(world).expect("second packaging");
    world.first_archive = Some(first);
}

#[then("the archive contains exactly \"{name}\"")]
fn then_contains_exactly(world: &mut ArchiveWorld, name: String) {
    let names: Vec<String> = read_entries(world).into_iter().map(|(n, _, _)| n).collect();
    assert_eq!(names, [name]);
}

#[then("the entry \"{name}\" is {size} bytes long")]
fn then_entry_size(world: &mut ArchiveWorld, name: String, size: u64) {
    let (_, actual, _) = find_entry(world, &name);
    assert_eq!(actual, size);
}

#[then("the entry \"{name}\" is readable and writable by everyone")]
fn then_entry_mode(world: &mut ArchiveWorld, name: String) {
    let (_, _, mode) = find_entry(world, &name);
    assert_eq!(mode & 0o666, 0o666, "mode {mode:o} lacks rw bits");
}

#[then("the archive entries are \"{names}\"")]
fn then_entries_in_order(world: &mut ArchiveWorld, names: String) {
    let expected: Vec<&str> = names.split(", ").collect();
    let actual: Vec<String> = read_entries(world).into_iter().map(|(n, _, _)| n).collect();
    assert_eq!(actual, expected);
}

#[then("packaging fails with a missing artifact error")]
fn then_missing_artifact(world: &mut ArchiveWorld) {
    let err = world.error.as_ref().expect("packaging error set");
    assert!(
        matches!(err, ArchiveError::MissingArtifact { skipped, .. } if skipped.len() == KNOWN_ARTIFACTS.len()),
        "expected MissingArtifact listing every known output, got {err:?}"
    );
}

#[then("no archive file exists")]
fn then_no_archive(world: &mut ArchiveWorld) {
    assert!(!archive_path(world).exists());
}

#[then("both archives are byte identical")]
fn then_identical(world: &mut ArchiveWorld) {
    let first = world.first_archive.as_ref().expect("first archive kept");
    let second = fs::read(archive_path(world)).expect("read second archive");
    assert_eq!(first, &second);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/archive_packaging.feature",
    name = "Package a single addon binary"
)]
fn scenario_single_binary(world: ArchiveWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_packaging.feature",
    name = "Both addon binaries are packaged in order"
)]
fn scenario_both_binaries(world: ArchiveWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_packaging.feature",
    name = "Packaging with no build outputs writes nothing"
)]
fn scenario_no_outputs(world: ArchiveWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_packaging.feature",
    name = "Repackaging unchanged outputs is byte identical"
)]
fn scenario_repackaging(world: ArchiveWorld) {
    let _ = world;
}
