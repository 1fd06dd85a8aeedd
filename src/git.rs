//! Last-change attribution from version history
//!
//! The resolver only needs two queries from a VCS: the most recent commit that
//! touched a path, and the locally configured user identity. Both sit behind
//! [`VersionControl`]; [`GitCli`] answers them by shelling out to `git` with a
//! deadline per invocation.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::config::RippleConfig;
use crate::core::CancelToken;
use crate::error::HistoryError;
use crate::utils::process::{ProcessError, run_bounded};

pub const GIT_DIR: &str = ".git";

/// `git log` date-format variants, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDialect {
    IsoStrict,
    Iso,
    CommitterIso,
}

impl LogDialect {
    pub const ALL: [LogDialect; 3] = [LogDialect::IsoStrict, LogDialect::Iso, LogDialect::CommitterIso];

    fn format_args(self) -> &'static [&'static str] {
        match self {
            LogDialect::IsoStrict => &["--pretty=format:%an|%ad", "--date=iso-strict"],
            LogDialect::Iso => &["--pretty=format:%an|%ad", "--date=iso"],
            LogDialect::CommitterIso => &["--pretty=format:%an|%ci"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub author: String,
    /// Date exactly as printed by the VCS
    pub date: String,
    #[serde(skip)]
    pub timestamp: Option<DateTime<FixedOffset>>,
}

impl CommitInfo {
    /// Parses `author|date`. Empty output means the path has no history.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (author, date) = raw.split_once('|').unwrap_or((raw, ""));
        let date = date.trim().to_string();
        Some(Self {
            author: author.trim().to_string(),
            timestamp: parse_timestamp(&date),
            date,
        })
    }
}

/// Accepts RFC 3339 (`--date=iso-strict`) and `2024-05-03 14:05:00 +0700` (`--date=iso`, `%ci`).
pub fn parse_timestamp(date: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(date)
        .or_else(|_| DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}

/// Who last changed the target, or why that is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LastChange {
    Commit(CommitInfo),
    /// The configured user, not file-specific
    Identity { author: String },
    Unavailable { reason: HistoryError },
}

pub trait VersionControl: Send + Sync {
    /// Most recent commit touching `file`, or `None` when it has no history.
    fn last_commit(
        &self,
        repo_root: &Path,
        file: &Path,
        dialect: LogDialect,
    ) -> Result<Option<CommitInfo>, HistoryError>;

    /// Locally configured user name, if any.
    fn user_identity(&self, repo_root: &Path) -> Result<Option<String>, HistoryError>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    log_timeout: Duration,
    identity_timeout: Duration,
    cancel: Option<CancelToken>,
}

impl GitCli {
    pub fn new(log_timeout: Duration, identity_timeout: Duration) -> Self {
        Self {
            program: PathBuf::from("git"),
            log_timeout,
            identity_timeout,
            cancel: None,
        }
    }

    pub fn from_config(config: &RippleConfig) -> Self {
        Self::new(config.git_timeout(), config.identity_timeout())
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Use a different executable, e.g. an absolute path to git.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, repo_root: &Path, args: &[&str], timeout: Duration) -> Result<String, HistoryError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(repo_root)
            .env("GIT_TERMINAL_PROMPT", "0");

        match run_bounded(command, timeout, self.cancel.as_ref()) {
            Ok(output) if output.status.success() => Ok(output.stdout),
            Ok(output) => Err(HistoryError::from_stderr(&output.stderr)),
            Err(ProcessError::NotFound) => Err(HistoryError::ToolNotInstalled),
            Err(ProcessError::Timeout(d)) => Err(HistoryError::Timeout(d)),
            Err(ProcessError::Cancelled) => Err(HistoryError::Cancelled),
            Err(ProcessError::Io(e)) => Err(HistoryError::Unknown(e.to_string())),
        }
    }
}

impl VersionControl for GitCli {
    fn last_commit(
        &self,
        repo_root: &Path,
        file: &Path,
        dialect: LogDialect,
    ) -> Result<Option<CommitInfo>, HistoryError> {
        let file = file.to_string_lossy().into_owned();
        let mut args = vec!["log", "-1"];
        args.extend_from_slice(dialect.format_args());
        args.push("--");
        args.push(&file);

        let stdout = self.run(repo_root, &args, self.log_timeout)?;
        Ok(CommitInfo::parse(&stdout))
    }

    fn user_identity(&self, repo_root: &Path) -> Result<Option<String>, HistoryError> {
        let stdout = match self.run(repo_root, &["config", "user.name"], self.identity_timeout) {
            Ok(s) => s,
            // `git config` exits 1 when the key is unset
            Err(HistoryError::Unknown(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let name = stdout.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }
}

/// Nearest ancestor of `start` (inclusive) that contains a `.git` entry.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GIT_DIR).exists())
        .map(Path::to_path_buf)
}

pub struct HistoryResolver<V: VersionControl = GitCli> {
    vcs: V,
}

impl HistoryResolver<GitCli> {
    pub fn from_config(config: &RippleConfig, cancel: CancelToken) -> Self {
        Self::new(GitCli::from_config(config).with_cancel(cancel))
    }
}

impl<V: VersionControl> HistoryResolver<V> {
    pub fn new(vcs: V) -> Self {
        Self { vcs }
    }

    /// Resolves the last change of `file`. Never fails: every problem becomes
    /// [`LastChange::Unavailable`].
    pub fn last_change(&self, file: &Path) -> LastChange {
        let start = file.parent().unwrap_or(file);
        let Some(repo_root) = find_repo_root(start) else {
            return LastChange::Unavailable {
                reason: HistoryError::NotARepository,
            };
        };

        let mut last_error = None;
        for dialect in LogDialect::ALL {
            tracing::debug!(?dialect, file = %file.display(), "querying last commit");
            match self.vcs.last_commit(&repo_root, file, dialect) {
                Ok(Some(commit)) => return LastChange::Commit(commit),
                Ok(None) => continue,
                Err(
                    reason @ (HistoryError::ToolNotInstalled
                    | HistoryError::Timeout(_)
                    | HistoryError::Cancelled
                    | HistoryError::NotARepository),
                ) => return LastChange::Unavailable { reason },
                Err(err) => {
                    tracing::debug!(?dialect, error = %err, "log dialect failed");
                    last_error = Some(err);
                }
            }
        }

        match self.vcs.user_identity(&repo_root) {
            Ok(Some(author)) => LastChange::Identity { author },
            Ok(None) => LastChange::Unavailable {
                reason: last_error.unwrap_or(HistoryError::NoCommits),
            },
            Err(err) => {
                tracing::debug!(error = %err, "identity lookup failed");
                LastChange::Unavailable {
                    reason: last_error.unwrap_or(HistoryError::NoCommits),
                }
            }
        }
    }
}
