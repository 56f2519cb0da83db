//! Subprocess execution pipeline for gitbuf.
//!
//! Runs git with a resolved worktree as the working directory, captures
//! both output streams fully buffered, and optionally pipes stdout through
//! a second "post-processor" command (a pager, a diff beautifier). The
//! pipeline is two explicit stages: the git stage, then the optional
//! post-processor stage whose status and streams replace the first stage's
//! in the final result.

use crate::error::{GitbufError, Result};
use crate::host::Host;
use crate::text::{decode_utf8, remove_ansi_escape_codes};
use crate::worktree::{find_worktree_from_suspects, list_worktree_suspects};
use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

/// Per-call execution options. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Explicit worktree to run in; resolved from the suspect list when absent.
    pub worktree: Option<PathBuf>,
    /// Fail with [`GitbufError::Execute`] on non-zero exit instead of
    /// returning a structured failure result.
    pub throw_on_error: bool,
    /// Optional command (argv tokens) that receives stdout on its stdin.
    pub post_processor: Vec<String>,
}

/// Outcome of one execution. Produced once; never mutated after return.
#[derive(Debug, Clone)]
pub struct ExecuteResult {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecuteResult {
    fn from_output(output: &Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        }
    }

    /// Decoded stdout as display lines.
    pub fn stdout_lines(&self) -> Vec<String> {
        crate::text::into_lines(&self.stdout)
    }
}

/// Run git with the given arguments.
///
/// 1. Reads the environment map and verbosity from the host.
/// 2. Resolves the worktree (explicit option or derived suspect list).
/// 3. Spawns `git --no-optional-locks <args>` with stdin closed, both
///    output streams captured, cwd = worktree, and the host's environment
///    overriding the inherited one. `--no-optional-locks` keeps git from
///    blocking on its own lock files when invocations race (a status
///    refresh overlapping a commit).
/// 4. On non-zero exit: fail with the ANSI-stripped stderr when
///    `throw_on_error` is set, else return `success = false`. The
///    post-processor never runs on failure.
/// 5. On success, the post-processor (when configured) receives stdout on
///    its stdin; its own status/stdout/stderr become the final result and
///    the original stdout is discarded.
pub fn execute(host: &dyn Host, args: &[String], options: &ExecuteOptions) -> Result<ExecuteResult> {
    let env = host.environ()?;
    let verbose = host.verbosity()? > 0;

    let worktree = match &options.worktree {
        Some(worktree) => worktree.clone(),
        None => find_worktree_from_suspects(host, &list_worktree_suspects(host)?, verbose)?,
    };

    if verbose {
        host.echo(&format!("[gitbuf] git {}", shell_words::join(args)))?;
    }

    let output = Command::new("git")
        .arg("--no-optional-locks")
        .args(args)
        .current_dir(&worktree)
        .envs(&env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            GitbufError::Execute(format!(
                "failed to execute git {}: {}",
                args.first().map(String::as_str).unwrap_or(""),
                e
            ))
        })?;

    // Early return when execution has failed.
    if !output.status.success() {
        if options.throw_on_error {
            return Err(execute_error(&output.stderr));
        }
        return Ok(ExecuteResult::from_output(&output));
    }

    if options.post_processor.is_empty() {
        return Ok(ExecuteResult::from_output(&output));
    }

    post_process(
        &options.post_processor,
        &output.stdout,
        &worktree,
        &env,
        options.throw_on_error,
    )
}

/// Pipe `input` through the post-processor command.
fn post_process(
    argv: &[String],
    input: &[u8],
    worktree: &Path,
    env: &HashMap<String, String>,
    throw_on_error: bool,
) -> Result<ExecuteResult> {
    let (program, rest) = argv
        .split_first()
        .ok_or_else(|| GitbufError::Validation("empty post-processor command".to_string()))?;

    let mut child = Command::new(program)
        .args(rest)
        .current_dir(worktree)
        .envs(env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            GitbufError::Execute(format!("failed to execute post-processor {}: {}", program, e))
        })?;

    // Feed stdin from a separate thread while the parent drains stdout and
    // stderr. Writing to completion first would deadlock as soon as both
    // the stdin and stdout pipes fill up, and a hung call can never be
    // cancelled by the host. stdin is piped, so take() cannot return None.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });

    let output = child.wait_with_output().map_err(|e| {
        GitbufError::Execute(format!("failed to wait for post-processor {}: {}", program, e))
    })?;

    if let Some(writer) = writer {
        let written = writer.join().map_err(|_| {
            GitbufError::Execute(format!(
                "failed to write to post-processor {}: writer thread panicked",
                program
            ))
        })?;
        // A post-processor that exits without draining stdin (head, a
        // quitting pager) closes the pipe early; that is not a failure.
        if let Err(e) = written
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(GitbufError::Execute(format!(
                "failed to write to post-processor {}: {}",
                program, e
            )));
        }
    }

    if throw_on_error && !output.status.success() {
        return Err(execute_error(&output.stderr));
    }

    Ok(ExecuteResult::from_output(&output))
}

fn execute_error(stderr: &[u8]) -> GitbufError {
    GitbufError::Execute(remove_ansi_escape_codes(&decode_utf8(stderr)))
}
