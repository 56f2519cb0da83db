//! Text utilities shared by the executor and feature commands.

use regex::Regex;
use std::sync::LazyLock;

/// Matches CSI sequences (`ESC [ ... final`) and OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ST`).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-9;?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\))")
        .expect("Invalid ANSI escape regex")
});

/// Decode raw subprocess output, replacing invalid UTF-8 sequences.
pub fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Remove ANSI escape sequences from a string.
///
/// Git colorizes stderr when it believes it is attached to a terminal;
/// error messages shown to the user must be plain text.
pub fn remove_ansi_escape_codes(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Split raw subprocess output into display lines.
///
/// A single trailing newline is not an extra (empty) line. Interior empty
/// lines are preserved. Empty input yields a single empty line, matching
/// how editors represent an empty buffer.
pub fn into_lines(bytes: &[u8]) -> Vec<String> {
    let text = decode_utf8(bytes);
    let text = text.strip_suffix('\n').unwrap_or(&text);
    if text.is_empty() {
        vec![String::new()]
    } else {
        text.split('\n').map(str::to_string).collect()
    }
}
