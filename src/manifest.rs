/// Workspace manifest synthesis and host package.json parsing
///
/// This module handles:
/// - Reading the host module's package.json (name + config block)
/// - Building the workspace dependency manifest from defaults and overrides
/// - Substituting the host module's self-reference with a local path
/// - Persisting the manifest into the workspace

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Identity marker of every synthesized workspace manifest
pub const MANIFEST_NAME: &str = "test-workspace";

/// File name the manifest is written under
pub const MANIFEST_FILE: &str = "package.json";

/// Fixed native binding every workspace needs, pinned to an exact minor range
pub const BASE_DEPENDENCY: (&str, &str) = ("serialport", "~10.5.0");

/// Local specifier substituted when the host module references itself
///
/// The workspace is a direct child of the host project, so the parent
/// directory is always the host's own (possibly modified) checkout.
pub const SELF_REFERENCE: &str = "file:..";

/// The dependency descriptor written into the workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    pub name: String,
    pub private: bool,
    pub dependencies: IndexMap<String, String>,
}

/// The host module's own manifest, as far as this tool cares
#[derive(Debug, Clone, Deserialize)]
pub struct HostManifest {
    pub name: String,
    #[serde(rename = "siblingPrep")]
    pub sibling_prep: Option<PrepConfig>,
}

/// Optional `"siblingPrep"` config block inside the host manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrepConfig {
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    pub special: Option<String>,
    pub workspace: Option<String>,
}

/// Read the host module's package.json
pub fn read_host_manifest(path: &Path) -> Result<HostManifest, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Build the workspace manifest
///
/// Pure function of its inputs. Merge order: base dependency, then the
/// dependency set, then the overrides, later entries replacing earlier ones
/// on key collision. If the host module's own name survives as a key, its
/// specifier becomes the local self-reference so it never resolves to a
/// remote fetch.
pub fn build_manifest(
    host_name: &str,
    dependencies: &IndexMap<String, String>,
    overrides: &IndexMap<String, String>,
) -> WorkspaceManifest {
    let mut merged: IndexMap<String, String> = IndexMap::new();
    merged.insert(BASE_DEPENDENCY.0.to_string(), BASE_DEPENDENCY.1.to_string());

    for (name, repository) in dependencies {
        merged.insert(name.clone(), repository.clone());
    }

    for (name, spec) in overrides {
        debug!("overriding {} -> {}", name, spec);
        merged.insert(name.clone(), spec.clone());
    }

    if let Some(entry) = merged.get_mut(host_name) {
        debug!("substituting self-reference for {}", host_name);
        *entry = SELF_REFERENCE.to_string();
    }

    WorkspaceManifest {
        name: MANIFEST_NAME.to_string(),
        private: true,
        dependencies: merged,
    }
}

/// Persist the manifest as the workspace's package.json
pub fn write_manifest(
    manifest: &WorkspaceManifest,
    workspace_dir: &Path,
) -> Result<PathBuf, String> {
    let path = workspace_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| format!("Failed to serialize manifest: {}", e))?;
    fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    debug!("wrote manifest to {}", path.display());
    Ok(path)
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod manifest_test;
