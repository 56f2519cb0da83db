//! Error types for the gitbuf core.
//!
//! Uses thiserror for derive macros. Every fallible operation in the crate
//! returns [`Result`], and errors carry user-presentable messages that the
//! embedding host can surface as editor notifications.

use thiserror::Error;

/// Main error type for gitbuf operations.
///
/// Variants map to the failure classes of the pipeline: validation errors
/// abort before any subprocess is spawned, worktree resolution errors abort
/// before any buffer mutation, and execute errors carry the cleaned stderr
/// of the failed subprocess.
#[derive(Error, Debug)]
pub enum GitbufError {
    /// Unknown flag/option or malformed input from the caller.
    #[error("{0}")]
    Validation(String),

    /// No candidate directory resolved to a git worktree root.
    #[error("no git worktree found: {0}")]
    NotAWorktree(String),

    /// A subprocess exited with a non-zero status or could not be spawned.
    /// The message is the decoded, ANSI-stripped stderr of the process.
    #[error("{0}")]
    Execute(String),

    /// Subprocess output did not match the expected format.
    #[error("unexpected output format: {0}")]
    Parse(String),

    /// A host RPC call failed.
    #[error("host call failed: {0}")]
    Host(String),
}

/// Result type alias for gitbuf operations.
pub type Result<T> = std::result::Result<T, GitbufError>;
