//! Source file discovery
//!
//! Walks a project tree depth-first and yields files whose extension is in the
//! allow list. Entries named in the exclusion list, and dot-prefixed entries, are
//! pruned before descending. Git ignore rules are deliberately not consulted: the
//! result only depends on the configured lists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::{Walk, WalkBuilder};

use crate::config::RippleConfig;
use crate::core::CancelToken;

/// Allow/deny lists for [`collect_source_files`].
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub extensions: Vec<String>,
    pub excluded: Vec<String>,
    pub skip_hidden: bool,
    pub follow_symlinks: bool,
}

impl CollectOptions {
    pub fn from_config(config: &RippleConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excluded: config.excluded_dirs.clone(),
            skip_hidden: config.skip_hidden,
            follow_symlinks: config.follow_symlinks,
        }
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::from_config(&RippleConfig::default())
    }
}

/// Lazy sequence of eligible source files under a root.
pub struct SourceFiles {
    walker: Option<Walk>,
    extensions: HashSet<String>,
    cancel: Option<CancelToken>,
}

impl SourceFiles {
    /// Stop yielding files once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_lowercase()))
    }
}

impl Iterator for SourceFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                self.walker = None;
                return None;
            }

            let result = self.walker.as_mut()?.next()?;
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) && self.is_source(entry.path()) {
                        return Some(entry.into_path());
                    }
                }
                Err(err) => tracing::warn!(error = %err, "skipping unreadable entry"),
            }
        }
    }
}

/// Walks `root` and yields eligible source files.
///
/// A missing or non-directory root yields nothing. Unreadable entries and
/// symlink loops are logged and skipped.
pub fn collect_source_files(root: &Path, options: &CollectOptions) -> SourceFiles {
    let extensions: HashSet<String> = options
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    if !root.is_dir() {
        return SourceFiles {
            walker: None,
            extensions,
            cancel: None,
        };
    }

    let excluded: HashSet<String> = options.excluded.iter().cloned().collect();
    let skip_hidden = options.skip_hidden;

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            if skip_hidden && name.starts_with('.') {
                return false;
            }
            !excluded.contains(&*name)
        });

    SourceFiles {
        walker: Some(builder.build()),
        extensions,
        cancel: None,
    }
}
