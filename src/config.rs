use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "ripple.toml";

/// Output format for the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Markdown,
    Json,
}

/// Main configuration for ripple
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    /// Source extensions eligible for scanning, without the leading dot
    pub extensions: Vec<String>,
    /// Directory or file names skipped during traversal (exact name match)
    pub excluded_dirs: Vec<String>,
    /// Skip every entry whose name starts with a dot
    pub skip_hidden: bool,
    /// Follow symbolic links while walking the project
    pub follow_symlinks: bool,
    /// Worker threads for file scanning (None = one per core)
    pub jobs: Option<usize>,
    /// Timeout for each `git log` dialect
    pub git_timeout_secs: u64,
    /// Timeout for the `git config user.name` fallback
    pub identity_timeout_secs: u64,
    /// Language used for the rendered report
    pub language: Locale,
    /// Output format (Plain, Markdown, JSON)
    pub output_format: OutputFormat,
    /// Enable debug logging
    pub verbose: bool,
}

impl RippleConfig {
    /// Loads `ripple.toml` from the project root, falling back to the user config
    /// directory. Returns `None` when neither exists.
    pub fn load(project_root: &Path) -> anyhow::Result<Option<Self>> {
        for candidate in Self::candidate_paths(project_root) {
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("Failed to read config: {:?}", candidate))?;
                let config = Self::from_toml(&content)
                    .with_context(|| format!("Failed to parse config: {:?}", candidate))?;
                tracing::debug!(path = %candidate.display(), "loaded configuration");
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.extensions = config
            .extensions
            .into_iter()
            .map(|e| normalize_extension(&e))
            .collect();
        Ok(config)
    }

    fn candidate_paths(project_root: &Path) -> Vec<PathBuf> {
        let mut paths = vec![project_root.join(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("ripple").join("config.toml"));
        }
        paths
    }

    /// Adds extensions, skipping duplicates. Accepts both `rs` and `.rs`.
    pub fn add_extensions<I: IntoIterator<Item = String>>(&mut self, extensions: I) {
        for ext in extensions {
            let ext = normalize_extension(&ext);
            if !ext.is_empty() && !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }
    }

    pub fn add_exclusions<I: IntoIterator<Item = String>>(&mut self, names: I) {
        for name in names {
            if !self.excluded_dirs.contains(&name) {
                self.excluded_dirs.push(name);
            }
        }
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(self.identity_timeout_secs)
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

impl Default for RippleConfig {
    fn default() -> Self {
        let extensions = ["js", "ts", "php", "go"];
        let excluded = [
            // Version Control
            ".git",
            ".hg",
            ".svn",
            // IDEs
            ".vscode",
            ".idea",
            // Build / Dependency
            "node_modules",
            "vendor",
            "dist",
            "build",
            "coverage",
            "target",
        ];

        Self {
            extensions: extensions.into_iter().map(String::from).collect(),
            excluded_dirs: excluded.into_iter().map(String::from).collect(),
            skip_hidden: true,
            follow_symlinks: false,
            jobs: None,
            git_timeout_secs: 10,
            identity_timeout_secs: 5,
            language: Locale::En,
            output_format: OutputFormat::Plain,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RippleConfig::default();
        assert_eq!(config.extensions, vec!["js", "ts", "php", "go"]);
        assert!(config.excluded_dirs.contains(&"node_modules".to_string()));
        assert!(config.excluded_dirs.contains(&".git".to_string()));
        assert!(!config.follow_symlinks);
        assert_eq!(config.git_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RippleConfig::from_toml(
            r#"
            extensions = [".rs", "PY"]
            follow_symlinks = true
            language = "id"
            output_format = "markdown"
            "#,
        )
        .unwrap();

        assert_eq!(config.extensions, vec!["rs", "py"]);
        assert!(config.follow_symlinks);
        assert_eq!(config.language, Locale::Id);
        assert_eq!(config.output_format, OutputFormat::Markdown);
        assert_eq!(config.identity_timeout_secs, 5);
        assert!(config.excluded_dirs.contains(&"vendor".to_string()));
    }

    #[test]
    fn test_add_lists_dedup() {
        let mut config = RippleConfig::default();
        config.add_extensions(vec![".js".to_string(), "rs".to_string()]);
        config.add_exclusions(vec!["vendor".to_string(), "tmp".to_string()]);

        assert_eq!(config.extensions.iter().filter(|e| *e == "js").count(), 1);
        assert!(config.extensions.contains(&"rs".to_string()));
        assert_eq!(config.excluded_dirs.iter().filter(|e| *e == "vendor").count(), 1);
        assert!(config.excluded_dirs.contains(&"tmp".to_string()));
    }

    #[test]
    fn test_load_from_project_root() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "jobs = 2\n").unwrap();

        let config = RippleConfig::load(temp.path()).unwrap().unwrap();
        assert_eq!(config.jobs, Some(2));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "jobs = [").unwrap();
        assert!(RippleConfig::load(temp.path()).is_err());
    }
}
