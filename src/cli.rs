use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "sibling-prep")]
#[command(about = "Prepare an isolated npm test workspace for cross-module integration tests")]
#[command(version)]
pub struct CliArgs {
    /// Path to the host module (directory or package.json file)
    #[arg(long, short = 'p', value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Branch under test, overriding the environment and the local checkout
    #[arg(long, short = 'b', value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Sibling dependency in "name=owner/repo" form, overriding the manifest
    /// config block. Can be repeated: --dependency modA=org/modA --dependency modB=org/modB
    #[arg(long, value_name = "NAME=OWNER/REPO")]
    pub dependency: Vec<String>,

    /// Name of the dependency installed via clone+link instead of the bulk manifest
    #[arg(long, value_name = "NAME")]
    pub special: Option<String>,

    /// Workspace directory name, created inside the host module directory
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<String>,

    /// Web host used for branch checks and clones
    #[arg(long, default_value = "github.com", value_name = "HOST")]
    pub github_host: String,

    /// Timeout in seconds for each remote branch existence check
    #[arg(long, default_value = "30", value_name = "SECONDS")]
    pub check_timeout: u64,

    /// Skip wiping a pre-existing workspace (useful when inspecting a failed run)
    #[arg(long)]
    pub keep_workspace: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations before doing any work
    pub fn validate(&self) -> Result<(), String> {
        for spec in &self.dependency {
            crate::config::parse_dependency_spec(spec)?;
        }

        if let Some(ref branch) = self.branch {
            if branch.trim().is_empty() {
                return Err("--branch must not be empty".to_string());
            }
        }

        if self.check_timeout == 0 {
            return Err("--check-timeout must be at least 1 second".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            path: None,
            branch: None,
            dependency: vec![],
            special: None,
            workspace: None,
            github_host: "github.com".to_string(),
            check_timeout: 30,
            keep_workspace: false,
        }
    }

    #[test]
    fn test_validate_default_args_succeeds() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_dependency_spec() {
        let mut args = base_args();
        args.dependency = vec!["modA".to_string()];
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_branch() {
        let mut args = base_args();
        args.branch = Some("  ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut args = base_args();
        args.check_timeout = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_wellformed_dependency_specs() {
        let mut args = base_args();
        args.dependency = vec!["modA=org/modA".to_string(), "modB=org/modB".to_string()];
        assert!(args.validate().is_ok());
    }
}
