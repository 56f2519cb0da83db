//! Rendering of parsed branch listings into display lines.

use super::parser::{BranchRecord, GitBranchResult};

/// Render a branch listing, one display line per record.
///
/// The branch column is padded to the widest name so hashes line up. Width
/// is counted in characters, not bytes, matching how format padding
/// counts; non-ASCII branch names must not skew the column.
pub fn render(result: &GitBranchResult) -> Vec<String> {
    let width = result
        .branches
        .iter()
        .map(|record| record.branch.chars().count())
        .max()
        .unwrap_or(0);
    result
        .branches
        .iter()
        .map(|record| render_record(record, width))
        .collect()
}

fn render_record(record: &BranchRecord, width: usize) -> String {
    let mark = if record.current { '*' } else { ' ' };

    // Symbolic-ref rows have no hash; show the ref they point at.
    if record.hash.is_empty() {
        return format!("{} {} -> {}", mark, record.branch, record.target);
    }

    let mut line = format!("{} {:<width$} {}", mark, record.branch, record.hash);
    if !record.target.is_empty() {
        line.push_str(&format!(" [{}]", record.target));
    }
    if !record.subject.is_empty() {
        line.push(' ');
        line.push_str(&record.subject);
    }
    line
}
