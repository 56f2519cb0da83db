//! Ex-command-style argument parsing for feature commands.
//!
//! Feature commands receive raw token lists from the editor command line.
//! Tokens are classified into options (`++name=value`), flags (`-f`,
//! `--flag`, `--flag=value`), and residues (everything else). A literal
//! `--` terminates flag parsing; later tokens are residues verbatim.

use crate::error::{GitbufError, Result};
use std::collections::BTreeMap;

/// Parsed command-line tokens.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// `++name=value` options addressed to the plugin itself.
    pub opts: BTreeMap<String, String>,
    /// `-f` / `--flag[=value]` flags forwarded to the subprocess.
    pub flags: BTreeMap<String, String>,
    /// Positional tokens.
    pub residues: Vec<String>,
}

/// Classify raw tokens into options, flags, and residues.
pub fn parse(args: &[String]) -> Parsed {
    let mut parsed = Parsed::default();
    let mut terminated = false;

    for token in args {
        if terminated {
            parsed.residues.push(token.clone());
        } else if token == "--" {
            terminated = true;
        } else if let Some(body) = token.strip_prefix("++") {
            let (name, value) = split_once_eq(body);
            parsed.opts.insert(name, value);
        } else if let Some(body) = token.strip_prefix("--") {
            let (name, value) = split_once_eq(body);
            parsed.flags.insert(name, value);
        } else if token.len() > 1 && token.starts_with('-') {
            let (name, value) = split_once_eq(&token[1..]);
            parsed.flags.insert(name, value);
        } else {
            parsed.residues.push(token.clone());
        }
    }

    parsed
}

fn split_once_eq(body: &str) -> (String, String) {
    match body.split_once('=') {
        Some((name, value)) => (name.to_string(), value.to_string()),
        None => (body.to_string(), String::new()),
    }
}

/// Reject options not in the allowed set.
pub fn validate_opts(opts: &BTreeMap<String, String>, allowed: &[&str]) -> Result<()> {
    for name in opts.keys() {
        if !allowed.contains(&name.as_str()) {
            return Err(GitbufError::Validation(format!(
                "unknown option '++{}'",
                name
            )));
        }
    }
    Ok(())
}

/// Reject flags not in the allowed set.
pub fn validate_flags(flags: &BTreeMap<String, String>, allowed: &[&str]) -> Result<()> {
    for name in flags.keys() {
        if !allowed.contains(&name.as_str()) {
            return Err(GitbufError::Validation(format!(
                "unknown flag '{}{}'",
                if name.len() == 1 { "-" } else { "--" },
                name
            )));
        }
    }
    Ok(())
}

/// Re-emit flags as subprocess argument tokens.
///
/// Single-character names become `-x`; longer names become `--name` or
/// `--name=value` when a value is present.
pub fn format_flags(flags: &BTreeMap<String, String>) -> Vec<String> {
    flags
        .iter()
        .map(|(name, value)| {
            let prefix = if name.len() == 1 { "-" } else { "--" };
            if value.is_empty() {
                format!("{}{}", prefix, name)
            } else {
                format!("{}{}={}", prefix, name, value)
            }
        })
        .collect()
}
