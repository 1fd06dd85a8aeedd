//! `.rippleignore` support - project-specific exclusion names

use std::fs;
use std::path::Path;

pub const RIPPLEIGNORE_FILE: &str = ".rippleignore";

/// Extra directory/file names to exclude, one per line.
/// Blank lines and `#` comments are skipped; a missing file yields nothing.
pub fn load_rippleignore(root: &Path) -> Vec<String> {
    let ignore_file = root.join(RIPPLEIGNORE_FILE);
    let content = match fs::read_to_string(&ignore_file) {
        Ok(c) => c,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %ignore_file.display(), error = %err, "could not read ignore file");
            return Vec::new();
        }
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.trim_end_matches('/').to_string())
        .collect()
}
