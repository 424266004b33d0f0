/// Core data structures for workspace preparation
///
/// This module defines the resolved run description ([`PrepPlan`]) and the
/// outcome summary ([`PrepOutcome`]) shared between config resolution and the
/// install pipeline.

use crate::branch::BranchUnderTest;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::time::Duration;

/// Fully resolved, immutable description of one preparation run
///
/// Built once by [`crate::config::build_plan`]; nothing mutates it afterward.
/// The dependency map preserves declaration order, which defines the order of
/// the per-dependency branch checks.
#[derive(Debug, Clone)]
pub struct PrepPlan {
    /// Directory of the host module under test (contains its package.json)
    pub project_dir: PathBuf,

    /// Declared name of the host module, read from its manifest
    pub project_name: String,

    /// The disposable workspace directory, a child of `project_dir`
    pub workspace_dir: PathBuf,

    /// Default sibling dependencies: name -> "owner/repo"
    pub dependencies: IndexMap<String, String>,

    /// Name of the dependency that needs the clone+link path, if any
    pub special: Option<String>,

    /// Web host for branch checks and clones (normally "github.com")
    pub git_host: String,

    /// Bounded timeout for each branch existence check
    pub check_timeout: Duration,

    /// Branch explicitly requested on the command line
    pub requested_branch: Option<String>,

    /// Skip the initial workspace wipe (for inspection re-runs)
    pub keep_workspace: bool,
}

/// The special dependency's resolved secondary install parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialInstall {
    pub name: String,
    /// "owner/repo" form
    pub repository: String,
    /// Override branch if one was confirmed, else "master"
    pub branch: String,
}

/// Summary of a completed preparation run
#[derive(Debug, Clone)]
pub struct PrepOutcome {
    /// The branch resolution this run used for every override check
    pub branch: BranchUnderTest,

    /// Confirmed overrides: name -> "owner/repo#branch"
    pub overrides: IndexMap<String, String>,

    /// Secondary install that ran, if the special dependency was declared
    pub special: Option<SpecialInstall>,

    /// Number of stale nested copies deleted after the bulk install
    pub removed_nested: usize,
}
