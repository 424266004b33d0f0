/// Branch-under-test resolution and remote branch probing
///
/// This module handles:
/// - Resolving which branch, if any, the current run should prefer
/// - Normalizing "master" (and detached HEAD) to "no override requested"
/// - Checking whether a dependency's repository has a matching remote branch

use log::debug;
use std::env;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

const USER_AGENT: &str = "sibling-prep/0.2.0 (https://github.com/imazen/sibling-prep)";

/// Environment variable consulted before the local git lookup
pub const BRANCH_ENV_VAR: &str = "SIBLING_PREP_BRANCH";

/// The branch that means "use the published versions" everywhere
pub const DEFAULT_BRANCH: &str = "master";

/// Outcome of branch resolution, computed exactly once per run
///
/// `Default` and `Unknown` both mean "no override requested", but they are
/// kept distinct so the decision stays auditable: one records that the
/// checkout was on the default branch, the other that no branch could be
/// determined at all (not a git checkout, git missing, detached state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchUnderTest {
    /// An override branch was requested; remote checks will look for it
    Named(String),
    /// Resolution produced the default branch
    Default,
    /// No environment value and the local git lookup failed
    Unknown,
}

impl BranchUnderTest {
    /// The branch remote checks should look for, if any
    pub fn override_branch(&self) -> Option<&str> {
        match self {
            BranchUnderTest::Named(b) => Some(b),
            _ => None,
        }
    }

    /// Human-readable form for status output
    pub fn describe(&self) -> String {
        match self {
            BranchUnderTest::Named(b) => format!("branch '{}'", b),
            BranchUnderTest::Default => format!("default branch ({})", DEFAULT_BRANCH),
            BranchUnderTest::Unknown => "no branch (local lookup failed)".to_string(),
        }
    }
}

/// Resolve the branch under test for this run
///
/// Resolution order: explicit CLI value, then the `SIBLING_PREP_BRANCH`
/// environment variable, then the active branch of the project checkout.
/// A failing git lookup is a legitimate non-error case and resolves to
/// `Unknown`. No network access.
pub fn branch_under_test(explicit: Option<&str>, project_dir: &Path) -> BranchUnderTest {
    resolve(explicit, env::var(BRANCH_ENV_VAR).ok(), || local_branch(project_dir))
}

/// Testable core of [`branch_under_test`]: all three sources as arguments
fn resolve<F>(explicit: Option<&str>, env_value: Option<String>, local: F) -> BranchUnderTest
where
    F: FnOnce() -> Option<String>,
{
    if let Some(branch) = explicit {
        debug!("branch under test from command line: {}", branch);
        return normalize(branch);
    }

    if let Some(branch) = env_value {
        debug!("branch under test from {}: {}", BRANCH_ENV_VAR, branch);
        return normalize(&branch);
    }

    match local() {
        Some(branch) => {
            debug!("branch under test from local checkout: {}", branch);
            normalize(&branch)
        }
        None => {
            debug!("local branch lookup failed, no branch under test");
            BranchUnderTest::Unknown
        }
    }
}

/// Normalize a raw branch name
///
/// "master" means "no override requested" even when it came from the
/// environment; "HEAD" is git's answer for a detached checkout.
fn normalize(raw: &str) -> BranchUnderTest {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "HEAD" {
        BranchUnderTest::Unknown
    } else if trimmed == DEFAULT_BRANCH {
        BranchUnderTest::Default
    } else {
        BranchUnderTest::Named(trimmed.to_string())
    }
}

/// Get the active branch of the checkout at `project_dir`, if any
fn local_branch(project_dir: &Path) -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(project_dir)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

/// Build the shared HTTP agent for branch existence checks
///
/// Timeout expiry surfaces as a transport error, which callers must treat as
/// a run failure rather than "branch absent".
pub fn web_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// The web URL probed to decide whether a branch exists
pub fn branch_url(host: &str, repository: &str, branch: &str) -> String {
    format!("https://{}/{}/tree/{}", host, repository, branch)
}

/// Check whether `repository` has a branch named `branch`
///
/// Returns `Ok(true)` only for HTTP 200 and `Ok(false)` for any other HTTP
/// status. Transport-level failures (DNS, TLS, timeout) propagate as `Err`:
/// a transient network failure must not be read as "branch does not exist".
pub fn branch_exists(
    agent: &ureq::Agent,
    host: &str,
    repository: &str,
    branch: &str,
) -> Result<bool, String> {
    let url = branch_url(host, repository, branch);
    debug!("checking {}", url);

    match agent.get(&url).set("User-Agent", USER_AGENT).call() {
        Ok(resp) => Ok(resp.status() == 200),
        Err(ureq::Error::Status(code, _)) => {
            debug!("{} answered {}, branch treated as absent", url, code);
            Ok(false)
        }
        Err(e) => Err(format!("Failed to check branch '{}' of {}: {}", branch, repository, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_branch_wins_over_env_and_local() {
        let got = resolve(Some("feature-x"), Some("other".to_string()), || {
            panic!("local lookup must not run when explicit branch given")
        });
        assert_eq!(got, BranchUnderTest::Named("feature-x".to_string()));
    }

    #[test]
    fn test_env_branch_used_when_no_explicit() {
        let got = resolve(None, Some("feature-y".to_string()), || {
            panic!("local lookup must not run when env var set")
        });
        assert_eq!(got, BranchUnderTest::Named("feature-y".to_string()));
    }

    #[test]
    fn test_master_from_env_normalizes_to_default() {
        let got = resolve(None, Some("master".to_string()), || None);
        assert_eq!(got, BranchUnderTest::Default);
        assert_eq!(got.override_branch(), None);
    }

    #[test]
    fn test_master_from_local_checkout_normalizes_to_default() {
        let got = resolve(None, None, || Some("master".to_string()));
        assert_eq!(got, BranchUnderTest::Default);
    }

    #[test]
    fn test_failed_local_lookup_is_unknown_not_default() {
        let got = resolve(None, None, || None);
        assert_eq!(got, BranchUnderTest::Unknown);
        assert_eq!(got.override_branch(), None);
    }

    #[test]
    fn test_detached_head_is_unknown() {
        let got = resolve(None, None, || Some("HEAD".to_string()));
        assert_eq!(got, BranchUnderTest::Unknown);
    }

    #[test]
    fn test_named_branch_from_local_checkout() {
        let got = resolve(None, None, || Some("feature-z".to_string()));
        assert_eq!(got.override_branch(), Some("feature-z"));
    }

    #[test]
    fn test_branch_url_shape() {
        assert_eq!(
            branch_url("github.com", "org/modA", "feature-x"),
            "https://github.com/org/modA/tree/feature-x"
        );
    }
}
