//! Core types shared across ripple modules

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::error::AnalysisError;
use crate::git::LastChange;
use crate::utils::analysis::risk::RiskTier;

/// Call context recorded for calls without a receiver.
pub const STANDALONE_CONTEXT: &str = "standalone";
/// Call context recorded for file name references.
pub const FILENAME_CONTEXT: &str = "filename";

/// Events emitted during the scanning process
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Scanning has started
    StartScanning,
    /// Number of candidate files discovered
    FilesFound(usize),
    /// A file has been scanned
    FileScanned(PathBuf),
    /// Version history lookup finished
    HistoryResolved,
    /// Analysis complete with the number of impacted files
    Complete(usize),
}

/// Shared cancellation flag for a single analysis run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a change touches: a file, and optionally one symbol inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub target_file: PathBuf,
    pub target_symbol: Option<String>,
    pub project_root: PathBuf,
}

impl ScanRequest {
    pub fn new(
        target_file: impl Into<PathBuf>,
        target_symbol: Option<String>,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target_file: target_file.into(),
            target_symbol,
            project_root: project_root.into(),
        }
    }

    /// Checks the inputs exist and returns a copy with canonical paths and a
    /// trimmed symbol.
    pub fn validate(&self) -> Result<Self, AnalysisError> {
        if !self.project_root.exists() {
            return Err(AnalysisError::RootNotFound(self.project_root.clone()));
        }
        if !self.project_root.is_dir() {
            return Err(AnalysisError::RootNotADirectory(self.project_root.clone()));
        }
        if !self.target_file.exists() {
            return Err(AnalysisError::TargetNotFound(self.target_file.clone()));
        }
        if !self.target_file.is_file() {
            return Err(AnalysisError::TargetNotAFile(self.target_file.clone()));
        }

        let target_symbol = match &self.target_symbol {
            Some(s) if s.trim().is_empty() => return Err(AnalysisError::EmptySymbol),
            Some(s) => Some(s.trim().to_string()),
            None => None,
        };

        let project_root = self
            .project_root
            .canonicalize()
            .map_err(|_| AnalysisError::RootNotFound(self.project_root.clone()))?;
        let target_file = self
            .target_file
            .canonicalize()
            .map_err(|_| AnalysisError::TargetNotFound(self.target_file.clone()))?;

        Ok(Self {
            target_file,
            target_symbol,
            project_root,
        })
    }

    /// Base name of the target, used as the file name keyword.
    pub fn target_filename(&self) -> String {
        self.target_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// How a line references the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    FilenameReference,
    MethodCall,
    StandaloneCall,
}

impl MatchType {
    pub fn default_context(self) -> &'static str {
        match self {
            MatchType::FilenameReference => FILENAME_CONTEXT,
            MatchType::MethodCall | MatchType::StandaloneCall => STANDALONE_CONTEXT,
        }
    }
}

/// A single line that references the target file or symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// 1-based line number
    pub line_number: usize,
    /// Line content, trimmed
    pub line_text: String,
    /// The keyword that matched (file name or symbol)
    pub keyword: String,
    pub match_type: MatchType,
    /// Receiver / namespace token, `standalone`, or `filename`
    pub call_context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    /// The file mentions the target's file name
    Direct,
    /// The file only calls the target symbol
    Indirect,
}

/// Everything found in one impacted file.
#[derive(Debug, Clone, Serialize)]
pub struct FileImpact {
    pub path: PathBuf,
    /// One record per line, ordered by line number
    pub matches: Vec<MatchRecord>,
    pub usage: Usage,
    /// At least one call site's receiver matches the declaring context
    pub is_high_confidence: bool,
    /// At least one call site of the target symbol was found (before dedup)
    pub symbol_matched: bool,
    /// Direct-usage file this indirect file was probably reached through
    pub via: Option<PathBuf>,
}

impl FileImpact {
    pub fn line_numbers(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.line_number).collect()
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Final, immutable result of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub requested_file: PathBuf,
    pub project_root: PathBuf,
    pub target_symbol: Option<String>,
    pub declaring_context: Option<String>,
    pub scanned_files: usize,
    /// Impacted files in discovery order
    pub impacts: Vec<FileImpact>,
    /// Files referencing the symbol (contextual files when any exist)
    pub symbol_file_count: Option<usize>,
    pub last_change: LastChange,
    pub risk: RiskTier,
}

impl ImpactReport {
    pub fn impacted_count(&self) -> usize {
        self.impacts.len()
    }

    pub fn get(&self, path: &Path) -> Option<&FileImpact> {
        self.impacts.iter().find(|i| i.path == path)
    }

    pub fn direct(&self) -> impl Iterator<Item = &FileImpact> {
        self.impacts.iter().filter(|i| i.usage == Usage::Direct)
    }

    pub fn indirect(&self) -> impl Iterator<Item = &FileImpact> {
        self.impacts.iter().filter(|i| i.usage == Usage::Indirect)
    }

    /// A symbol was requested but no call site was found anywhere.
    pub fn symbol_not_found(&self) -> bool {
        self.target_symbol.is_some() && self.symbol_file_count == Some(0)
    }

    /// `path` relative to the project root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.project_root).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_rejects_missing_inputs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("a.js");
        std::fs::write(&file, "").unwrap();

        let missing_root = ScanRequest::new(&file, None, root.join("nope"));
        assert!(matches!(missing_root.validate(), Err(AnalysisError::RootNotFound(_))));

        let root_is_file = ScanRequest::new(&file, None, &file);
        assert!(matches!(root_is_file.validate(), Err(AnalysisError::RootNotADirectory(_))));

        let missing_target = ScanRequest::new(root.join("b.js"), None, root);
        assert!(matches!(missing_target.validate(), Err(AnalysisError::TargetNotFound(_))));

        let target_is_dir = ScanRequest::new(root, None, root);
        assert!(matches!(target_is_dir.validate(), Err(AnalysisError::TargetNotAFile(_))));

        let blank_symbol = ScanRequest::new(&file, Some("   ".into()), root);
        assert!(matches!(blank_symbol.validate(), Err(AnalysisError::EmptySymbol)));
    }

    #[test]
    fn test_validate_canonicalizes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::write(root.join("src/a.js"), "").unwrap();

        let request = ScanRequest::new(root.join("src/../src/a.js"), Some(" run ".into()), root);
        let valid = request.validate().unwrap();

        assert_eq!(valid.target_file, root.canonicalize().unwrap().join("src/a.js"));
        assert_eq!(valid.target_symbol.as_deref(), Some("run"));
        assert_eq!(valid.target_filename(), "a.js");
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
