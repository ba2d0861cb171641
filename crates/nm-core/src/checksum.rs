//! Script statement splitting and CRC-32 checksums for change detection.

use crc32fast::Hasher;

/// Split a Cypher script into statements.
///
/// Statements are terminated by `;`. Each statement is trimmed and empty
/// statements are dropped. Text after the final `;` is not a statement.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut pieces: Vec<&str> = script.split(';').collect();
    let trailing = pieces.pop().unwrap_or_default();
    if !trailing.trim().is_empty() {
        log::warn!(
            "Ignoring unterminated text at the end of a script (missing ';'): {:?}",
            trailing.trim()
        );
    }

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Checksum recorded for a script with no statements.
pub const EMPTY_CHECKSUM: &str = "None";

/// Compute the CRC-32 checksum of a statement list as a decimal string.
///
/// The CRC runs over the concatenated statement bytes with no separator, the
/// format existing ledgers were written with. A byte change inside a
/// statement changes the value, but moving a statement boundary does not:
/// `["A", "B"]` and `["AB"]` share a checksum. An empty list yields
/// [`EMPTY_CHECKSUM`].
pub fn compute_checksum<S: AsRef<str>>(statements: &[S]) -> String {
    if statements.is_empty() {
        return EMPTY_CHECKSUM.to_string();
    }
    let mut hasher = Hasher::new();
    for statement in statements {
        hasher.update(statement.as_ref().as_bytes());
    }
    hasher.finalize().to_string()
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
