//! Behaviour-driven tests for runtime/ABI target selection.

use noble_prebuild::target::{
    Abi, BuildTarget, MANIFEST, ManifestEntry, Runtime, TargetFilterPolicy, enumerate,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Default)]
struct TargetWorld {
    manifest: Vec<ManifestEntry>,
    selected: Vec<BuildTarget>,
}

#[fixture]
fn world() -> TargetWorld {
    TargetWorld::default()
}

#[given("a manifest entry for \"{runtime}\" ABI {abi}")]
fn given_manifest_entry(world: &mut TargetWorld, runtime: String, abi: u32) {
    let runtime: Runtime = runtime.parse().expect("known runtime");
    world.manifest.push(ManifestEntry {
        target: BuildTarget::new(runtime, Abi::new(abi).expect("valid ABI")),
        version: "0.0.0",
    });
}

#[when("the manifest is filtered with the default policy")]
fn when_filtered(world: &mut TargetWorld) {
    world.selected = enumerate(&world.manifest, &TargetFilterPolicy::default());
}

#[when("the built-in manifest is filtered with the default policy")]
fn when_builtin_filtered(world: &mut TargetWorld) {
    world.selected = enumerate(MANIFEST, &TargetFilterPolicy::default());
}

#[then("the selected targets are \"{targets}\"")]
fn then_selected(world: &mut TargetWorld, targets: String) {
    let actual: Vec<String> = world.selected.iter().map(ToString::to_string).collect();
    let expected: Vec<&str> = targets.split(", ").collect();
    assert_eq!(actual, expected);
}

#[then("the first selected target is \"{target}\"")]
fn then_first_selected(world: &mut TargetWorld, target: String) {
    let first = world.selected.first().expect("at least one target selected");
    assert_eq!(first.to_string(), target);
}

#[then("no selected target is below its runtime minimum")]
fn then_all_above_minimum(world: &mut TargetWorld) {
    for target in &world.selected {
        let minimum = match target.runtime {
            Runtime::Node => 79,
            Runtime::Electron => 98,
        };
        assert!(target.abi.get() >= minimum, "{target} should be filtered out");
    }
}

#[scenario(
    path = "tests/features/target_selection.feature",
    name = "Default policy drops outdated runtimes"
)]
fn scenario_default_policy(world: TargetWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_selection.feature",
    name = "Built-in manifest selects current node releases first"
)]
fn scenario_builtin_manifest(world: TargetWorld) {
    let _ = world;
}
