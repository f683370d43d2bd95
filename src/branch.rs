//! Branch resolution.
//!
//! The active branch comes from the `STEEL_TOES_BRANCH` environment variable
//! when it is set, otherwise from git in the project directory.

use log::{debug, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable that overrides the git branch.
pub const BRANCH_ENV_VAR: &str = "STEEL_TOES_BRANCH";

/// Resolve the branch to namespace datasets with.
///
/// A non-empty `STEEL_TOES_BRANCH` is returned verbatim. Otherwise git is
/// asked for the current branch of `project_dir` (the working directory when
/// `None`). Returns `None` when neither source yields a branch.
pub fn resolve_branch(project_dir: Option<&Path>) -> Option<String> {
    let override_value = env::var(BRANCH_ENV_VAR).ok();
    branch_from_override(override_value.as_deref(), project_dir)
}

/// Precedence rule behind [`resolve_branch`], with the override passed in.
pub fn branch_from_override(
    override_value: Option<&str>,
    project_dir: Option<&Path>,
) -> Option<String> {
    match override_value {
        Some(branch) if !branch.is_empty() => {
            debug!("Using branch '{}' from {}", branch, BRANCH_ENV_VAR);
            Some(branch.to_string())
        }
        _ => current_git_branch(project_dir),
    }
}

/// Abbreviated name of the checked out git branch.
///
/// Any failure (not a repository, git missing, non-zero exit) is logged as a
/// warning and reported as `None`.
pub fn current_git_branch(project_dir: Option<&Path>) -> Option<String> {
    let dir = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let output = match Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(&dir)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Unable to git describe {}: {}", dir.display(), e);
            return None;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("Unable to git describe {}: {}", dir.display(), stderr.trim());
        return None;
    }

    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() { None } else { Some(branch) }
}
