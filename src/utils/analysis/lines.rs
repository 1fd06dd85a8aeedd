//! Line-level keyword scanning
//!
//! Plain substring containment, not word-boundary matching: a keyword matches
//! anywhere inside a line, including comments, strings and longer identifiers.

use std::fs;
use std::path::Path;

use crate::core::{MatchRecord, MatchType};

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8192;

/// Every (line, keyword) pair where `keyword` is contained in the line.
///
/// Records come out in line order; keywords are tried in the order given, so one
/// line can produce a record per keyword.
pub fn scan_lines(content: &str, keywords: &[&str], match_type: MatchType) -> Vec<MatchRecord> {
    let mut results = Vec::new();
    for (index, line) in content.lines().enumerate() {
        for keyword in keywords {
            if !keyword.is_empty() && line.contains(keyword) {
                results.push(MatchRecord {
                    line_number: index + 1,
                    line_text: line.trim().to_string(),
                    keyword: keyword.to_string(),
                    match_type,
                    call_context: match_type.default_context().to_string(),
                });
            }
        }
    }
    results
}

/// Reads `path` as UTF-8 text. Binary or unreadable files yield `None` and a warning.
pub fn read_source(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read file");
            return None;
        }
    };

    if is_binary(&bytes) {
        tracing::warn!(path = %path.display(), "skipping binary file");
        return None;
    }

    match String::from_utf8(bytes) {
        Ok(s) => Some(s),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "file is not valid UTF-8");
            None
        }
    }
}

/// File variant of [`scan_lines`]; read failures produce no matches.
pub fn scan_file(path: &Path, keywords: &[&str], match_type: MatchType) -> Vec<MatchRecord> {
    read_source(path)
        .map(|content| scan_lines(&content, keywords, match_type))
        .unwrap_or_default()
}

fn is_binary(content: &[u8]) -> bool {
    let check_len = content.len().min(BINARY_SNIFF_LEN);
    content[..check_len].contains(&0)
}
