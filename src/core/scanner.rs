//! Per-file scanning
//!
//! Runs the line scanner for the target's file name and, when a symbol was
//! requested, the call-site matcher. Pure over (path, content), so files can be
//! scanned in parallel without shared state.

use std::path::{Path, PathBuf};

use crate::core::{MatchRecord, MatchType};
use crate::utils::analysis::context::CallMatcher;
use crate::utils::analysis::lines::{read_source, scan_lines};

/// Raw findings for one file, before deduplication.
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    pub path: PathBuf,
    pub filename_matches: Vec<MatchRecord>,
    pub symbol_matches: Vec<MatchRecord>,
}

impl FileScan {
    pub fn is_empty(&self) -> bool {
        self.filename_matches.is_empty() && self.symbol_matches.is_empty()
    }
}

pub struct FileScanner {
    filename: String,
    matcher: Option<CallMatcher>,
}

impl FileScanner {
    pub fn new(filename: &str, symbol: Option<&str>) -> Self {
        Self {
            filename: filename.to_string(),
            matcher: symbol.map(CallMatcher::new),
        }
    }

    pub fn scan_content(&self, path: PathBuf, content: &str) -> FileScan {
        let filename_matches = scan_lines(content, &[self.filename.as_str()], MatchType::FilenameReference);
        let symbol_matches = self
            .matcher
            .as_ref()
            .map(|m| m.scan(content))
            .unwrap_or_default();

        FileScan {
            path,
            filename_matches,
            symbol_matches,
        }
    }

    /// Reads and scans `path`; unreadable files produce an empty scan.
    pub fn scan(&self, path: &Path) -> FileScan {
        match read_source(path) {
            Some(content) => self.scan_content(path.to_path_buf(), &content),
            None => FileScan {
                path: path.to_path_buf(),
                ..FileScan::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_only() {
        let scanner = FileScanner::new("a.js", None);
        let scan = scanner.scan_content(PathBuf::from("b.js"), "require('./a.js');\nfoo(1);\n");
        assert_eq!(scan.filename_matches.len(), 1);
        assert!(scan.symbol_matches.is_empty());
    }

    #[test]
    fn test_filename_and_symbol() {
        let scanner = FileScanner::new("widget.js", Some("render"));
        let scan = scanner.scan_content(
            PathBuf::from("page.js"),
            "import Widget from './widget.js';\nwidget.render();\n",
        );
        assert_eq!(scan.filename_matches[0].line_number, 1);
        assert_eq!(scan.symbol_matches[0].line_number, 2);
        assert_eq!(scan.symbol_matches[0].match_type, MatchType::MethodCall);
        assert!(!scan.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_empty() {
        let scanner = FileScanner::new("a.js", Some("run"));
        let scan = scanner.scan(Path::new("/definitely/missing/file.js"));
        assert!(scan.is_empty());
    }
}
