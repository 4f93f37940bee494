//! History listing and selection for the REPL

use planstore::StoredPlanRecord;

/// Parsed answer to the history selection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Blank input returns to the main prompt
    Back,
    /// Zero-based index into the listed records
    Open(usize),
    /// Anything else
    Invalid,
}

/// One display line per record, labelled from 1 in listing order
///
/// Records are named by their storage key, not by the project name inside.
pub fn history_lines(records: &[StoredPlanRecord]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| format!("{:>3}. {}", i + 1, record.key.display_name()))
        .collect()
}

/// Interpret the user's answer against a listing of `len` records
pub fn parse_selection(input: &str, len: usize) -> Selection {
    let input = input.trim();
    if input.is_empty() {
        return Selection::Back;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Selection::Open(n - 1),
        _ => Selection::Invalid,
    }
}
