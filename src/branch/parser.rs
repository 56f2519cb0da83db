//! Fixed-format parser for `git branch --list -vv` output.

use crate::error::{GitbufError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Symbolic-ref rows, e.g. `remotes/origin/HEAD -> origin/main`.
static ALIAS_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<marker>[*+])?\s*(?P<branch>\S+)\s+->\s+(?P<target>\S+)$")
        .expect("Invalid alias row regex")
});

/// Regular rows, e.g. `* main abc1234 [origin/main: ahead 1] subject`.
/// The marker column is `*` for the current checkout and `+` for branches
/// checked out in a linked worktree (git 2.23). The branch column is
/// either a name or a parenthesized detached-HEAD description.
static BRANCH_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<marker>[*+])?\s*(?P<branch>\([^)]+\)|\S+)\s+(?P<hash>[0-9a-f]{4,40})\s+(?P<rest>.*)$")
        .expect("Invalid branch row regex")
});

/// Optional upstream prefix of the subject column: `[target]` or
/// `[target: state]`.
static UPSTREAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<target>[^\]:]+)(?::[^\]]*)?\]\s*(?P<subject>.*)$")
        .expect("Invalid upstream regex")
});

/// One parsed row of branch listing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Branch name (or detached-HEAD description).
    pub branch: String,
    /// Upstream target, empty when the branch has none. Symbolic-ref rows
    /// carry the ref they point at.
    pub target: String,
    /// Abbreviated commit hash; empty for symbolic-ref rows.
    pub hash: String,
    /// Commit subject; empty for symbolic-ref rows.
    pub subject: String,
    /// Whether this branch is the current checkout.
    pub current: bool,
}

/// All rows of one invocation, in output order until sorted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitBranchResult {
    pub branches: Vec<BranchRecord>,
}

/// Parse raw `git branch --list -vv` output.
///
/// Rows that match no known form are a [`GitbufError::Parse`] error,
/// propagated as-is.
pub fn parse(stdout: &str) -> Result<GitBranchResult> {
    let mut branches = Vec::new();

    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(captures) = ALIAS_ROW.captures(line) {
            branches.push(BranchRecord {
                branch: captures["branch"].to_string(),
                target: captures["target"].to_string(),
                hash: String::new(),
                subject: String::new(),
                current: is_current(&captures),
            });
        } else if let Some(captures) = BRANCH_ROW.captures(line) {
            let rest = &captures["rest"];
            let (target, subject) = match UPSTREAM.captures(rest) {
                Some(upstream) => (
                    upstream["target"].to_string(),
                    upstream["subject"].to_string(),
                ),
                None => (String::new(), rest.to_string()),
            };
            branches.push(BranchRecord {
                branch: captures["branch"].to_string(),
                target,
                hash: captures["hash"].to_string(),
                subject,
                current: is_current(&captures),
            });
        } else {
            return Err(GitbufError::Parse(line.to_string()));
        }
    }

    Ok(GitBranchResult { branches })
}

/// Only `*` marks the current checkout; `+` marks a branch checked out in
/// another (linked) worktree.
fn is_current(captures: &regex::Captures<'_>) -> bool {
    captures.name("marker").map(|m| m.as_str()) == Some("*")
}
