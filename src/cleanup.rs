/// Stale nested-copy cleanup
///
/// npm may install an older copy of a declared dependency beneath another
/// installed package's own node_modules, where it would shadow the pinned or
/// branch-overridden top-level version. After the bulk install, every nested
/// copy of every originally-declared dependency name is deleted, at any
/// depth, scoped packages included.

use log::debug;
use std::fs;
use std::path::Path;

/// Delete nested copies of `names` beneath the packages in `node_modules`
///
/// `names` is the originally-declared dependency set, special dependency
/// included. The top-level copies themselves are untouched; only copies
/// inside other packages' node_modules are removed. A missing node_modules
/// directory is not an error. Returns the number of copies removed.
pub fn remove_nested_copies(node_modules: &Path, names: &[String]) -> Result<usize, String> {
    if !node_modules.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in read_dir(node_modules)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let dir_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if dir_name == ".bin" {
            continue;
        }

        if dir_name.starts_with('@') {
            // Scoped packages sit one directory deeper
            for scoped in read_dir(&path)? {
                let scoped_path = scoped?.path();
                if scoped_path.is_dir() {
                    removed += prune_package(&scoped_path, names)?;
                }
            }
        } else {
            removed += prune_package(&path, names)?;
        }
    }

    Ok(removed)
}

/// Remove shadowing copies under one installed package, then recurse
fn prune_package(package_dir: &Path, names: &[String]) -> Result<usize, String> {
    let nested = package_dir.join("node_modules");
    if !nested.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for name in names {
        let shadow = nested.join(name);
        if shadow.exists() {
            fs::remove_dir_all(&shadow)
                .map_err(|e| format!("Failed to remove nested copy {}: {}", shadow.display(), e))?;
            debug!("removed nested copy {}", shadow.display());
            removed += 1;
        }
    }

    removed += remove_nested_copies(&nested, names)?;
    Ok(removed)
}

fn read_dir(dir: &Path) -> Result<impl Iterator<Item = Result<fs::DirEntry, String>>, String> {
    let dir_display = dir.display().to_string();
    let iter = fs::read_dir(dir).map_err(|e| format!("Failed to list {}: {}", dir_display, e))?;
    Ok(iter.map(move |e| e.map_err(|err| format!("Failed to list {}: {}", dir_display, err))))
}
