//! Branch listing feature.
//!
//! `command` validates its arguments and opens a virtual buffer whose name
//! encodes everything needed to (re)build the listing; `read` runs against
//! an already-open buffer by decoding that name, executing git, and
//! synchronizing the rendered rows into the buffer. The parsed result is
//! kept in a buffer-local variable so `candidates` can later map a line
//! range back to records for interactive selection.

pub mod parser;
pub mod render;

use crate::args;
use crate::buffer;
use crate::bufname::{self, Bufname};
use crate::dispatch::Dispatcher;
use crate::error::{GitbufError, Result};
use crate::host::{BufferId, Host};
use crate::process::{execute, ExecuteOptions};
use crate::text::decode_utf8;
use parser::{BranchRecord, GitBranchResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Buffer name scheme for branch listing buffers.
pub const SCHEME: &str = "gitbranch";

/// Buffer-local variable holding the parsed [`GitBranchResult`].
pub const RESULT_VAR: &str = "gitbuf_branch_result";

/// Flags forwarded to `git branch`. Anything else is rejected before a
/// subprocess is spawned.
const ALLOWED_FLAGS: &[&str] = &[
    "a",
    "all",
    "r",
    "remotes",
    "i",
    "ignore-case",
    "abbrev",
    "no-abbrev",
];

/// A branch record annotated for interactive consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub record: BranchRecord,
    /// The value an action receives when this candidate is selected.
    pub value: String,
}

/// Register `branch:command`, `branch:read`, and `branch:candidates`.
pub fn register(dispatcher: &mut Dispatcher) {
    dispatcher.register("branch:command", |host, args| {
        let tokens = string_list_arg(args, 0)?;
        let bufnr = command(host, &tokens)?;
        Ok(json!(bufnr))
    });
    dispatcher.register("branch:read", |host, _args| {
        read(host)?;
        Ok(Value::Null)
    });
    dispatcher.register("branch:candidates", |host, args| {
        let start = integer_arg(args, 0)?;
        let end = integer_arg(args, 1)?;
        let candidates = candidates(host, start, end)?;
        serde_json::to_value(candidates)
            .map_err(|e| GitbufError::Host(format!("failed to serialize candidates: {}", e)))
    });
}

/// Validate arguments, resolve the worktree, and open the listing buffer.
///
/// Unknown flags and options fail fast with a validation error; nothing is
/// spawned and no buffer is touched in that case.
pub fn command(host: &dyn Host, tokens: &[String]) -> Result<BufferId> {
    let parsed = args::parse(tokens);
    args::validate_opts(&parsed.opts, &["worktree"])?;
    args::validate_flags(&parsed.flags, ALLOWED_FLAGS)?;

    let worktree = crate::worktree::worktree_from_opts(host, &parsed)?;
    let bufname = Bufname {
        scheme: SCHEME.to_string(),
        expr: worktree.display().to_string(),
        params: parsed.flags,
        fragment: if parsed.residues.is_empty() {
            None
        } else {
            Some(parsed.residues.join(" "))
        },
    };
    host.open_buffer(&bufname.format())
}

/// Build the listing for the current buffer from its encoded name.
pub fn read(host: &dyn Host) -> Result<()> {
    let bufnr = host.current_buffer()?;
    let bufname = bufname::parse(&host.buffer_name(bufnr)?)?;

    let mut git_args = vec!["branch".to_string(), "--list".to_string(), "-vv".to_string()];
    git_args.extend(args::format_flags(&bufname.params));
    // The fragment is one pattern token, verbatim; quotes and spaces are
    // part of the pattern, not shell syntax.
    if let Some(fragment) = &bufname.fragment {
        git_args.push(fragment.clone());
    }

    let result = execute(
        host,
        &git_args,
        &ExecuteOptions {
            worktree: Some(PathBuf::from(&bufname.expr)),
            throw_on_error: true,
            post_processor: Vec::new(),
        },
    )?;

    let mut listing = parser::parse(&decode_utf8(&result.stdout))?;
    // Stable sort: records with equal targets keep their output order.
    listing.branches.sort_by(|a, b| a.target.cmp(&b.target));

    host.set_option(bufnr, "filetype", json!("gitbuf-branch"))?;
    host.set_option(bufnr, "bufhidden", json!("unload"))?;
    host.set_option(bufnr, "buftype", json!("nofile"))?;
    host.set_option(bufnr, "swapfile", json!(false))?;
    host.set_option(bufnr, "modifiable", json!(false))?;
    host.set_var(
        bufnr,
        RESULT_VAR,
        serde_json::to_value(&listing)
            .map_err(|e| GitbufError::Host(format!("failed to serialize listing: {}", e)))?,
    )?;

    let content = render::render(&listing);
    buffer::replace(host, bufnr, &content)?;
    buffer::concrete(host, bufnr)
}

/// Map a 1-based inclusive line range back to the stored records.
///
/// Both ends are clamped to `[1, ∞)`; ranges past the end of the listing
/// yield an empty set. Returns an empty set when the current buffer holds
/// no listing.
pub fn candidates(host: &dyn Host, start: i64, end: i64) -> Result<Vec<Candidate>> {
    let bufnr = host.current_buffer()?;
    let Some(stored) = host.get_var(bufnr, RESULT_VAR)? else {
        return Ok(Vec::new());
    };
    let listing: GitBranchResult = serde_json::from_value(stored)
        .map_err(|e| GitbufError::Host(format!("invalid stored listing: {}", e)))?;

    let start = start.max(1) as usize;
    let end = (end.max(1) as usize).min(listing.branches.len());
    if start > end {
        return Ok(Vec::new());
    }

    Ok(listing.branches[start - 1..end]
        .iter()
        .map(|record| Candidate {
            value: record.branch.clone(),
            record: record.clone(),
        })
        .collect())
}

fn string_list_arg(args: &[Value], index: usize) -> Result<Vec<String>> {
    let list = args
        .get(index)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GitbufError::Validation(format!("argument {} must be a list of strings", index))
        })?;
    list.iter()
        .map(|value| {
            value.as_str().map(str::to_string).ok_or_else(|| {
                GitbufError::Validation(format!("argument {} must be a list of strings", index))
            })
        })
        .collect()
}

fn integer_arg(args: &[Value], index: usize) -> Result<i64> {
    args.get(index).and_then(Value::as_i64).ok_or_else(|| {
        GitbufError::Validation(format!("argument {} must be an integer", index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::option_bool;
    use crate::test_support::{create_test_repo, git, TestHost};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_rejects_unknown_flags_before_spawning() {
        // cwd is not even a repo: validation must fail first.
        let host = TestHost::new(std::env::temp_dir());
        let err = command(&host, &tokens(&["--delete"])).unwrap_err();
        assert!(matches!(err, GitbufError::Validation(_)));
    }

    #[test]
    fn command_opens_a_buffer_with_an_encoded_name() {
        let repo = create_test_repo();
        let host = TestHost::new(repo.path().to_path_buf());

        let bufnr = command(&host, &tokens(&["-a", "feature/*"])).unwrap();
        let name = host.buffer_name(bufnr).unwrap();
        let decoded = bufname::parse(&name).unwrap();
        assert_eq!(decoded.scheme, SCHEME);
        assert!(decoded.params.contains_key("a"));
        assert_eq!(decoded.fragment.as_deref(), Some("feature/*"));
        assert_eq!(
            PathBuf::from(&decoded.expr).canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn read_fills_the_buffer_and_stores_the_listing() {
        let repo = create_test_repo();
        git(repo.path(), &["branch", "dev"]);
        let host = TestHost::new(repo.path().to_path_buf());

        let bufnr = command(&host, &[]).unwrap();
        read(&host).unwrap();

        let lines = host.lines(bufnr);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|line| line.contains("* main")));
        assert!(lines.iter().any(|line| line.contains("dev")));

        assert!(!option_bool(&host, bufnr, "modifiable").unwrap());
        assert_eq!(
            host.option(bufnr, "buftype").unwrap(),
            json!("nofile")
        );
        assert_eq!(
            host.option(bufnr, "filetype").unwrap(),
            json!("gitbuf-branch")
        );
        assert!(host.get_var(bufnr, RESULT_VAR).unwrap().is_some());
    }

    #[test]
    fn read_respects_the_fragment_pattern() {
        let repo = create_test_repo();
        git(repo.path(), &["branch", "feature/one"]);
        git(repo.path(), &["branch", "other"]);
        let host = TestHost::new(repo.path().to_path_buf());

        command(&host, &tokens(&["feature/*"])).unwrap();
        read(&host).unwrap();

        let bufnr = host.current_buffer().unwrap();
        let lines = host.lines(bufnr);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("feature/one"));
    }

    #[test]
    fn read_passes_the_fragment_verbatim_as_one_pattern() {
        let repo = create_test_repo();
        git(repo.path(), &["branch", "fix'quote"]);
        git(repo.path(), &["branch", "other"]);
        let host = TestHost::new(repo.path().to_path_buf());

        // A quote in the pattern is pattern text, not shell syntax.
        command(&host, &tokens(&["fix'*"])).unwrap();
        read(&host).unwrap();

        let bufnr = host.current_buffer().unwrap();
        let lines = host.lines(bufnr);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("fix'quote"));
    }

    #[test]
    fn candidates_maps_line_ranges_to_records() {
        let repo = create_test_repo();
        git(repo.path(), &["branch", "dev"]);
        let host = TestHost::new(repo.path().to_path_buf());
        command(&host, &[]).unwrap();
        read(&host).unwrap();

        let all = candidates(&host, 1, 2).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, all[0].record.branch);

        let first = candidates(&host, 1, 1).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].record.branch, all[0].record.branch);
    }

    #[test]
    fn candidates_clamps_out_of_range_input() {
        let repo = create_test_repo();
        let host = TestHost::new(repo.path().to_path_buf());
        command(&host, &[]).unwrap();
        read(&host).unwrap();

        // Negative ends clamp to line 1.
        let clamped = candidates(&host, -5, 0).unwrap();
        assert_eq!(clamped.len(), 1);

        // Past-the-end ranges yield nothing.
        assert!(candidates(&host, 10, 20).unwrap().is_empty());
    }

    #[test]
    fn candidates_without_a_listing_is_empty() {
        let host = TestHost::new(std::env::temp_dir());
        assert!(candidates(&host, 1, 10).unwrap().is_empty());
    }

    #[test]
    fn dispatcher_round_trip() {
        let repo = create_test_repo();
        let host = TestHost::new(repo.path().to_path_buf());
        let mut dispatcher = Dispatcher::new();
        register(&mut dispatcher);

        dispatcher
            .dispatch(&host, "branch:command", &[json!([])])
            .unwrap();
        dispatcher.dispatch(&host, "branch:read", &[]).unwrap();
        let candidates = dispatcher
            .dispatch(&host, "branch:candidates", &[json!(1), json!(10)])
            .unwrap();
        let candidates = candidates.as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["value"], json!("main"));
        assert_eq!(candidates[0]["current"], json!(true));
    }

    #[test]
    fn dispatcher_rejects_malformed_arguments() {
        let host = TestHost::new(std::env::temp_dir());
        let mut dispatcher = Dispatcher::new();
        register(&mut dispatcher);

        let err = dispatcher
            .dispatch(&host, "branch:command", &[json!("not-a-list")])
            .unwrap_err();
        assert!(matches!(err, GitbufError::Validation(_)));

        let err = dispatcher
            .dispatch(&host, "branch:candidates", &[json!(1)])
            .unwrap_err();
        assert!(matches!(err, GitbufError::Validation(_)));
    }
}
