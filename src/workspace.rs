use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use backport_core::vcs::{CommandRunner, discover_toplevel};
use tracing::{debug, warn};

/// Working tree to operate on: the explicit `--workspace` directory, else the
/// git top-level enclosing `cwd`, else none.
pub async fn resolve_workspace<R: CommandRunner + ?Sized>(
    explicit: Option<&Path>,
    cwd: &Path,
    runner: &R,
    git_program: &str,
) -> Result<Option<PathBuf>> {
    if let Some(dir) = explicit {
        if !dir.is_dir() {
            bail!("Workspace {} is not a directory", dir.display());
        }
        return Ok(Some(canonicalize_workspace(dir)));
    }

    let discovered = discover_toplevel(runner, git_program, cwd).await;
    debug!(cwd = %cwd.display(), workspace = ?discovered, "Resolved workspace");
    Ok(discovered.map(|dir| canonicalize_workspace(&dir)))
}

pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the current directory")
}

fn canonicalize_workspace(workspace: &Path) -> PathBuf {
    match workspace.canonicalize() {
        Ok(canonical) => canonical,
        Err(error) => {
            warn!(
                workspace = %workspace.display(),
                error = ?error,
                "Failed to canonicalize workspace path; using provided path"
            );
            workspace.to_path_buf()
        }
    }
}
