//! Error types for the analysis pipeline

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Terminal errors raised by [`crate::runner::analyze`].
///
/// Everything except `Cancelled` and `WorkerPool` is raised while validating the
/// request, before a single file has been read.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("target file does not exist: {0:?}")]
    TargetNotFound(PathBuf),
    #[error("target is not a regular file: {0:?}")]
    TargetNotAFile(PathBuf),
    #[error("project root does not exist: {0:?}")]
    RootNotFound(PathBuf),
    #[error("project root is not a directory: {0:?}")]
    RootNotADirectory(PathBuf),
    #[error("symbol name must not be empty")]
    EmptySymbol,
    #[error("analysis cancelled")]
    Cancelled,
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Reasons the version history of a file could not be resolved.
///
/// These never escape the history resolver as errors; they end up inside the
/// report so it can still be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum HistoryError {
    #[error("not a git repository")]
    NotARepository,
    #[error("no commits yet for this file")]
    NoCommits,
    #[error("git is not installed")]
    ToolNotInstalled,
    #[error("git command timed out after {0:?}")]
    Timeout(Duration),
    #[error("git command cancelled")]
    Cancelled,
    #[error("unknown git error: {0}")]
    Unknown(String),
}

impl HistoryError {
    /// Classify a failed git invocation by its stderr text.
    pub fn from_stderr(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if lower.contains("not a git repository") {
            HistoryError::NotARepository
        } else if lower.contains("does not have any commits") || lower.contains("bad default revision") {
            HistoryError::NoCommits
        } else if lower.contains("command not found") {
            HistoryError::ToolNotInstalled
        } else if lower.contains("timeout") || lower.contains("timed out") {
            HistoryError::Timeout(Duration::ZERO)
        } else {
            HistoryError::Unknown(stderr.trim().to_string())
        }
    }
}
