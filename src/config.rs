/// Configuration resolution module
///
/// This module handles:
/// - Locating the host module's package.json
/// - Merging the manifest's config block with command-line overrides
/// - Producing a fully resolved, immutable PrepPlan for the pipeline
use crate::cli::CliArgs;
use crate::manifest;
use crate::types::PrepPlan;
use indexmap::IndexMap;
use log::debug;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the host manifest, mirroring --path
pub const MANIFEST_ENV_VAR: &str = "SIBLING_PREP_MANIFEST";

/// Default workspace directory name inside the host module
pub const DEFAULT_WORKSPACE: &str = "test-workspace";

/// Build a complete PrepPlan from CLI arguments
///
/// Everything is resolved upfront so the pipeline receives a validated,
/// immutable run description. A missing or nameless host manifest is a fatal
/// environment error.
pub fn build_plan(args: &CliArgs) -> Result<PrepPlan, String> {
    debug!("building preparation plan from CLI args");

    let manifest_path = locate_manifest(args);
    let project_dir = manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let host = manifest::read_host_manifest(&manifest_path)
        .map_err(|e| format!("Failed to read host manifest: {}", e))?;
    debug!("host module: {}", host.name);

    let config = host.sibling_prep.unwrap_or_default();

    let mut dependencies: IndexMap<String, String> =IndexMap::new();
    for (name, repository) in &config.dependencies {
        if !valid_repository(repository) {
            return Err(format!(
                "Dependency '{}' has repository '{}', expected owner/repo form",
                name, repository
            ));
        }
        dependencies.insert(name.clone(), repository.clone());
    }

    // CLI-supplied dependencies win over the config block, last one wins
    for spec in &args.dependency {
        let (name, repository) = parse_dependency_spec(spec)?;
        dependencies.insert(name, repository);
    }

    let special = args.special.clone().or(config.special);
    let workspace_name = args
        .workspace
        .clone()
        .or(config.workspace)
        .unwrap_or_else(|| DEFAULT_WORKSPACE.to_string());

    debug!(
        "plan: {} dependencies, special = {:?}, workspace = {}",
        dependencies.len(),
        special,
        workspace_name
    );

    Ok(PrepPlan {
        workspace_dir: project_dir.join(&workspace_name),
        project_dir,
        project_name: host.name,
        dependencies,
        special,
        git_host: args.github_host.clone(),
        check_timeout: Duration::from_secs(args.check_timeout),
        requested_branch: args.branch.clone(),
        keep_workspace: args.keep_workspace,
    })
}

/// Locate the host manifest: --path (dir or file), env var, else ./package.json
fn locate_manifest(args: &CliArgs) -> PathBuf {
    if let Some(ref path) = args.path {
        if path.is_dir() { path.join(manifest::MANIFEST_FILE) } else { path.clone() }
    } else {
        let env_manifest = env::var(MANIFEST_ENV_VAR);
        PathBuf::from(env_manifest.unwrap_or_else(|_| format!("./{}", manifest::MANIFEST_FILE)))
    }
}

/// Parse a "name=owner/repo" dependency argument
pub fn parse_dependency_spec(spec: &str) -> Result<(String, String), String> {
    let (name, repository) = spec
        .split_once('=')
        .ok_or_else(|| format!("Invalid dependency '{}', expected name=owner/repo", spec))?;

    if name.is_empty() || !valid_repository(repository) {
        return Err(format!("Invalid dependency '{}', expected name=owner/repo", spec));
    }

    Ok((name.to_string(), repository.to_string()))
}

/// A repository identifier is "owner/repo": one slash, nonempty halves
fn valid_repository(repository: &str) -> bool {
    match repository.split_once('/') {
        Some((owner, repo)) => {
            !owner.is_empty() && !repo.is_empty() && !repo.contains('/') && !repository.contains('#')
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
