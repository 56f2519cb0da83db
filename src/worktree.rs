//! Worktree resolution for gitbuf.
//!
//! Commands never trust a single directory: they evaluate an ordered list
//! of candidate directories ("suspects") and run git in the first one that
//! turns out to lie inside a worktree. Resolution is deterministic given
//! the same suspect ordering and filesystem state, and has no side effects
//! beyond filesystem reads and git queries.

use crate::args::Parsed;
use crate::error::{GitbufError, Result};
use crate::host::Host;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locate the worktree root containing `path` via `git rev-parse --show-toplevel`.
///
/// Returns `None` when the directory does not exist, git cannot be spawned
/// there, or the directory is not inside a worktree.
fn probe_worktree_root(path: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .current_dir(path)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() {
        None
    } else {
        Some(PathBuf::from(root))
    }
}

/// Resolve the worktree root from an ordered list of candidate directories.
///
/// The first suspect that lies inside a git worktree wins. Verbose tracing
/// goes through the host so it reaches the user; stderr of an embedded
/// plugin does not.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The worktree root of the first valid suspect
/// * `Err(GitbufError::NotAWorktree)` - If no suspect resolves
pub fn find_worktree_from_suspects(
    host: &dyn Host,
    suspects: &[PathBuf],
    verbose: bool,
) -> Result<PathBuf> {
    for suspect in suspects {
        if verbose {
            host.echo(&format!(
                "[gitbuf] trying worktree suspect: {}",
                suspect.display()
            ))?;
        }
        if let Some(root) = probe_worktree_root(suspect) {
            if verbose {
                host.echo(&format!("[gitbuf] worktree resolved to: {}", root.display()))?;
            }
            return Ok(root);
        }
    }

    let tried: Vec<String> = suspects.iter().map(|p| p.display().to_string()).collect();
    Err(GitbufError::NotAWorktree(tried.join(", ")))
}

/// Derive the suspect list from the editor state.
///
/// The directory of the current buffer's backing file comes first (editing
/// a file in repo A while the editor's cwd is repo B must target A), then
/// the editor's current working directory. Duplicates are skipped.
pub fn list_worktree_suspects(host: &dyn Host) -> Result<Vec<PathBuf>> {
    let mut suspects = Vec::new();

    let bufnr = host.current_buffer()?;
    if let Some(path) = host.buffer_path(bufnr)?
        && let Some(dir) = path.parent()
    {
        suspects.push(dir.to_path_buf());
    }

    let cwd = host.cwd()?;
    if !suspects.contains(&cwd) {
        suspects.push(cwd);
    }

    Ok(suspects)
}

/// Resolve the worktree for a feature command.
///
/// An explicit `++worktree=` option (expanded through the host) is the sole
/// suspect when present; otherwise the derived list is used.
pub fn worktree_from_opts(host: &dyn Host, parsed: &Parsed) -> Result<PathBuf> {
    let verbose = host.verbosity()? > 0;
    let suspects = match parsed.opts.get("worktree") {
        Some(worktree) => vec![PathBuf::from(host.expand(worktree)?)],
        None => list_worktree_suspects(host)?,
    };
    find_worktree_from_suspects(host, &suspects, verbose)
}
