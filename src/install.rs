/// The ordered workspace preparation pipeline
///
/// A single linear flow: prepare the workspace, resolve branch overrides,
/// pull the special dependency out of the bulk path, synthesize and persist
/// the manifest, bulk install, delete stale nested copies, then run the
/// clone+link secondary install if the special dependency was declared.
/// Any step's failure aborts the remaining steps; there is no retry and no
/// partial rollback.

use crate::branch::{self, BranchUnderTest, DEFAULT_BRANCH};
use crate::cleanup;
use crate::manifest;
use crate::npm;
use crate::types::{PrepOutcome, PrepPlan, SpecialInstall};
use crate::ui;
use indexmap::IndexMap;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Run the full pipeline with the real network checker
pub fn prepare(plan: &PrepPlan) -> Result<PrepOutcome, String> {
    let agent = branch::web_agent(plan.check_timeout);
    prepare_with_checker(plan, |repository, branch_name| {
        branch::branch_exists(&agent, &plan.git_host, repository, branch_name)
    })
}

/// Run the full pipeline with an injected branch existence checker
///
/// The checker receives (repository, branch) and is only invoked when a
/// branch is actually under test; its errors abort the run.
pub fn prepare_with_checker<F>(plan: &PrepPlan, check_branch: F) -> Result<PrepOutcome, String>
where
    F: Fn(&str, &str) -> Result<bool, String>,
{
    // Resolved once; every override check below reuses this value.
    let branch = branch::branch_under_test(plan.requested_branch.as_deref(), &plan.project_dir);
    ui::status(&format!("testing against {}", branch.describe()));

    prepare_workspace(&plan.workspace_dir, plan.keep_workspace)?;

    let mut overrides = resolve_overrides(&plan.dependencies, &branch, &check_branch)?;

    let mut dependencies = plan.dependencies.clone();
    let special = extract_special(plan, &branch, &mut dependencies, &mut overrides);

    let synthesized = manifest::build_manifest(&plan.project_name, &dependencies, &overrides);
    manifest::write_manifest(&synthesized, &plan.workspace_dir)?;

    ui::status(&format!("installing {} dependencies", synthesized.dependencies.len()));
    npm::npm_install(&plan.workspace_dir)?;

    // Cleanup runs over the originally-declared names, special included,
    // so a stray transitive copy can never shadow a pinned version.
    let declared: Vec<String> = plan.dependencies.keys().cloned().collect();
    let removed_nested =
        cleanup::remove_nested_copies(&plan.workspace_dir.join("node_modules"), &declared)?;
    if removed_nested > 0 {
        ui::status(&format!("removed {} stale nested copies", removed_nested));
    }

    if let Some(ref special) = special {
        install_special(plan, special)?;
    }

    Ok(PrepOutcome { branch, overrides, special, removed_nested })
}

/// Step 1: wipe and recreate the workspace directory
///
/// Absence of a previous workspace is not an error. With `keep` the wipe is
/// skipped and a pre-existing directory is reused as-is.
pub fn prepare_workspace(dir: &Path, keep: bool) -> Result<(), String> {
    if !keep {
        match fs::remove_dir_all(dir) {
            Ok(()) => debug!("removed previous workspace {}", dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(format!("Failed to remove {}: {}", dir.display(), e)),
        }
    }

    fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {}", dir.display(), e))
}

/// Step 2: confirm which dependencies have a matching remote branch
///
/// Checks run in declaration order and all of them complete before the
/// manifest is synthesized. Without a branch under test the checker is never
/// invoked and the override set is empty.
pub fn resolve_overrides<F>(
    dependencies: &IndexMap<String, String>,
    branch: &BranchUnderTest,
    check_branch: &F,
) -> Result<IndexMap<String, String>, String>
where
    F: Fn(&str, &str) -> Result<bool, String>,
{
    let mut overrides = IndexMap::new();

    let Some(branch_name) = branch.override_branch() else {
        debug!("no branch under test, override set is empty");
        return Ok(overrides);
    };

    for (name, repository) in dependencies {
        if check_branch(repository, branch_name)? {
            debug!("{} has branch {}, overriding", repository, branch_name);
            overrides.insert(name.clone(), format!("{}#{}", repository, branch_name));
        } else {
            debug!("{} has no branch {}, keeping default", repository, branch_name);
        }
    }

    Ok(overrides)
}

/// Step 3: pull the special dependency out of the bulk path
///
/// Removes it from both the dependency set and the override set so it never
/// reaches the written manifest, remembering its repository and resolved
/// branch for the secondary install.
pub fn extract_special(
    plan: &PrepPlan,
    branch: &BranchUnderTest,
    dependencies: &mut IndexMap<String, String>,
    overrides: &mut IndexMap<String, String>,
) -> Option<SpecialInstall> {
    let name = plan.special.as_deref()?;
    let repository = dependencies.shift_remove(name)?;

    let resolved_branch = if overrides.shift_remove(name).is_some() {
        // An override exists only when a named branch was confirmed remotely
        branch.override_branch().unwrap_or(DEFAULT_BRANCH).to_string()
    } else {
        DEFAULT_BRANCH.to_string()
    };

    debug!("special dependency {} -> {} at {}", name, repository, resolved_branch);
    Some(SpecialInstall { name: name.to_string(), repository, branch: resolved_branch })
}

/// Step 7: clone, install, and link the special dependency
fn install_special(plan: &PrepPlan, special: &SpecialInstall) -> Result<(), String> {
    ui::status(&format!(
        "installing {} from {} at {}",
        special.name, special.repository, special.branch
    ));

    let url = format!("https://{}/{}.git", plan.git_host, special.repository);
    npm::git_clone(&plan.workspace_dir, &url, &special.branch, &special.name)?;

    let clone_dir = plan.workspace_dir.join(&special.name);
    npm::npm_install(&clone_dir)?;
    npm::npm_link_register(&clone_dir)?;
    npm::npm_link_package(&plan.workspace_dir, &special.name)
}

#[cfg(test)]
#[path = "install_test.rs"]
mod install_test;
