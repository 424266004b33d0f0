/// End-to-end scenarios for workspace preparation, up to the manifest write
///
/// These tests drive the pipeline's decision steps with an injected branch
/// checker and a temporary directory, verifying the manifest that a bulk
/// install would run against. The npm/git subprocess steps themselves are
/// exercised separately (they need real binaries and a network).
use indexmap::IndexMap;
use sibling_prep::branch::BranchUnderTest;
use sibling_prep::cleanup;
use sibling_prep::install::{extract_special, prepare_workspace, resolve_overrides};
use sibling_prep::manifest::{self, SELF_REFERENCE};
use sibling_prep::types::PrepPlan;
use std::path::Path;
use std::time::Duration;

fn deps(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn plan_in(dir: &Path, dependencies: IndexMap<String, String>, special: Option<&str>) -> PrepPlan {
    PrepPlan {
        project_dir: dir.to_path_buf(),
        project_name: "host-mod".to_string(),
        workspace_dir: dir.join("test-workspace"),
        dependencies,
        special: special.map(str::to_string),
        git_host: "github.com".to_string(),
        check_timeout: Duration::from_secs(30),
        requested_branch: None,
        keep_workspace: false,
    }
}

/// Run steps 1-4 of the pipeline with an injected checker, returning the
/// manifest read back from disk
fn synthesize_to_disk(
    plan: &PrepPlan,
    branch: &BranchUnderTest,
    checker: impl Fn(&str, &str) -> Result<bool, String>,
) -> (serde_json::Value, Option<sibling_prep::types::SpecialInstall>) {
    prepare_workspace(&plan.workspace_dir, false).unwrap();

    let mut overrides = resolve_overrides(&plan.dependencies, branch, &checker).unwrap();
    let mut dependencies = plan.dependencies.clone();
    let special = extract_special(plan, branch, &mut dependencies, &mut overrides);

    let synthesized = manifest::build_manifest(&plan.project_name, &dependencies, &overrides);
    let path = manifest::write_manifest(&synthesized, &plan.workspace_dir).unwrap();

    let raw = std::fs::read_to_string(path).unwrap();
    (serde_json::from_str(&raw).unwrap(), special)
}

#[test]
fn scenario_a_no_branch_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(dir.path(), deps(&[("modA", "org/modA")]), None);

    let (json, special) = synthesize_to_disk(&plan, &BranchUnderTest::Unknown, |_, _| {
        panic!("no network call expected without a branch under test")
    });

    assert!(special.is_none());
    assert_eq!(json["name"], "test-workspace");
    assert_eq!(json["private"], true);
    assert_eq!(json["dependencies"]["modA"], "org/modA");
    // Base native binding plus the single declared dependency
    assert_eq!(json["dependencies"].as_object().unwrap().len(), 2);
}

#[test]
fn scenario_b_confirmed_branch_is_substituted() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(dir.path(), deps(&[("modA", "org/modA")]), None);
    let branch = BranchUnderTest::Named("feature-x".to_string());

    let (json, _) = synthesize_to_disk(&plan, &branch, |repository, branch_name| {
        Ok(repository == "org/modA" && branch_name == "feature-x")
    });

    assert_eq!(json["dependencies"]["modA"], "org/modA#feature-x");
}

#[test]
fn scenario_c_special_dependency_bypasses_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        deps(&[("modA", "org/modA"), ("special-kit", "org/special-kit")]),
        Some("special-kit"),
    );
    let branch = BranchUnderTest::Named("feature-x".to_string());

    let (json, special) = synthesize_to_disk(&plan, &branch, |_, _| Ok(true));

    assert!(json["dependencies"].get("special-kit").is_none());
    let special = special.unwrap();
    assert_eq!(special.repository, "org/special-kit");
    assert_eq!(special.branch, "feature-x");
}

#[test]
fn scenario_d_host_module_becomes_local_reference() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(dir.path(), deps(&[("host-mod", "org/host-mod")]), None);

    let (json, _) = synthesize_to_disk(&plan, &BranchUnderTest::Unknown, |_, _| {
        panic!("no network call expected")
    });

    assert_eq!(json["dependencies"]["host-mod"], SELF_REFERENCE);
}

#[test]
fn workspace_is_wiped_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(dir.path(), deps(&[]), None);

    prepare_workspace(&plan.workspace_dir, false).unwrap();
    std::fs::write(plan.workspace_dir.join("leftover.txt"), "previous run").unwrap();

    let (_, _) = synthesize_to_disk(&plan, &BranchUnderTest::Unknown, |_, _| Ok(false));
    assert!(!plan.workspace_dir.join("leftover.txt").exists());
    assert!(plan.workspace_dir.join("package.json").exists());
}

#[test]
fn cleanup_prunes_declared_names_including_special() {
    // The cleanup pass iterates the originally-declared names, so even the
    // special dependency's stray nested copies are removed.
    let dir = tempfile::tempdir().unwrap();
    let nm = dir.path().join("test-workspace/node_modules");
    for nested in ["modA", "special-kit"] {
        let shadow = nm.join("other/node_modules").join(nested);
        std::fs::create_dir_all(&shadow).unwrap();
        std::fs::write(shadow.join("package.json"), "{}").unwrap();
    }

    let declared = vec!["modA".to_string(), "special-kit".to_string()];
    let removed = cleanup::remove_nested_copies(&nm, &declared).unwrap();

    assert_eq!(removed, 2);
    assert!(!nm.join("other/node_modules/modA").exists());
    assert!(!nm.join("other/node_modules/special-kit").exists());
}
