/// Subprocess collaborators: the npm CLI and git clone
///
/// Every invocation takes an explicit working directory rather than relying
/// on the ambient process cwd, so the pipeline's steps stay independently
/// reproducible. All calls block until the child exits; a non-zero exit is
/// converted into an error carrying a stderr excerpt.

use log::debug;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

/// Captured result of one child process run
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Run a program to completion in `dir`, capturing output
fn run_command(program: &str, args: &[&str], dir: &Path) -> Result<CommandOutput, String> {
    debug!("running {} {:?} in {}", program, args, dir.display());

    let start = Instant::now();
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    let result = CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration: start.elapsed(),
    };

    debug!("{} finished: success={}, duration={:?}", program, result.success, result.duration);
    Ok(result)
}

/// Convert a failed run into an error with the tail of its stderr
fn require_success(context: &str, output: CommandOutput) -> Result<(), String> {
    if output.success {
        return Ok(());
    }
    Err(format!("{}: {}", context, stderr_excerpt(&output)))
}

/// Last few stderr lines, falling back to stdout when stderr is empty
fn stderr_excerpt(output: &CommandOutput) -> String {
    let source = if output.stderr.trim().is_empty() { &output.stdout } else { &output.stderr };
    let lines: Vec<&str> = source.lines().collect();
    let tail_start = lines.len().saturating_sub(12);
    let tail = lines[tail_start..].join("\n");
    if tail.trim().is_empty() { "(no output)".to_string() } else { tail }
}

/// Bulk install against the manifest already written in `dir`
pub fn npm_install(dir: &Path) -> Result<(), String> {
    let output = run_command("npm", &["install"], dir)?;
    require_success(&format!("npm install failed in {}", dir.display()), output)
}

/// Register the package in `dir` as globally linkable
pub fn npm_link_register(dir: &Path) -> Result<(), String> {
    let output = run_command("npm", &["link"], dir)?;
    require_success(&format!("npm link failed in {}", dir.display()), output)
}

/// Link the registered package `name` into the dependency tree of `dir`
pub fn npm_link_package(dir: &Path, name: &str) -> Result<(), String> {
    let output = run_command("npm", &["link", name], dir)?;
    require_success(&format!("npm link {} failed in {}", name, dir.display()), output)
}

/// Shallow-clone one branch of `url` into `dest_name` under `dir`
pub fn git_clone(dir: &Path, url: &str, branch: &str, dest_name: &str) -> Result<(), String> {
    let output =
        run_command("git", &["clone", "--depth", "1", "--branch", branch, url, dest_name], dir)?;
    require_success(&format!("git clone of {} at {} failed", url, branch), output)
}
