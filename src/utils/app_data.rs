use crate::index::types::EnvVersion;
use crate::query::scorer::ScoringWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "sphindex";
const CONFIG_FILE: &str = "config.json";

/// Per-project config file looked up in the documentation source root
pub const PROJECT_CONFIG_FILE: &str = "sphindex.json";

/// Default name of the generated index
pub const INDEX_FILE_NAME: &str = "searchindex.js";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// File suffixes treated as documentation pages
    #[serde(default = "default_source_suffixes")]
    pub source_suffixes: Vec<String>,

    /// Glob patterns (relative to the source root) excluded from the build
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Generator versions written into new indexes and expected from existing ones
    #[serde(default = "default_envversion")]
    pub envversion: EnvVersion,

    /// Search result ranking
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Parse pages on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_source_suffixes() -> Vec<String> {
    [".md", ".markdown", ".rst", ".txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    vec!["_build/**".to_string(), "**/.ipynb_checkpoints/**".to_string()]
}

/// Versions recorded by the Sphinx 8 builds this tool mirrors
pub fn default_envversion() -> EnvVersion {
    [
        ("sphinx", 64),
        ("sphinx.domains.c", 3),
        ("sphinx.domains.changeset", 1),
        ("sphinx.domains.citation", 1),
        ("sphinx.domains.cpp", 9),
        ("sphinx.domains.index", 1),
        ("sphinx.domains.javascript", 3),
        ("sphinx.domains.math", 2),
        ("sphinx.domains.python", 4),
        ("sphinx.domains.rst", 2),
        ("sphinx.domains.std", 2),
        ("sphinx.ext.intersphinx", 1),
    ]
    .into_iter()
    .map(|(name, version)| (name.to_string(), version))
    .collect()
}

fn default_parallel() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_suffixes: default_source_suffixes(),
            exclude_patterns: default_exclude_patterns(),
            envversion: default_envversion(),
            scoring: ScoringWeights::default(),
            parallel: default_parallel(),
        }
    }
}

impl AppConfig {
    /// Load the user config, then let `sphindex.json` in `source_root` take precedence
    pub fn load(source_root: Option<&Path>) -> Result<Self> {
        if let Some(root) = source_root {
            let project = root.join(PROJECT_CONFIG_FILE);
            if project.exists() {
                tracing::debug!("using project config {}", project.display());
                return Self::load_from(&project);
            }
        }

        match get_config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Write config as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Whether a path has one of the configured page suffixes
    pub fn is_source_file(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.source_suffixes
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
    }
}

/// Get the path to the user config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: XDG_CONFIG_HOME or ~/.config
        dirs::config_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.parallel);
        assert_eq!(config.envversion.get("sphinx"), Some(&64));
        assert!(config.source_suffixes.contains(&".md".to_string()));
    }

    #[test]
    fn test_app_config_partial_json() {
        // Missing fields fall back to defaults
        let json = r#"{"parallel": false}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!(!config.parallel);
        assert_eq!(config.exclude_patterns, default_exclude_patterns());
        assert_eq!(config.scoring.title, 15);
    }

    #[test]
    fn test_app_config_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_project_config_wins() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.source_suffixes = vec![".rst".to_string()];
        config.save_to(&dir.path().join(PROJECT_CONFIG_FILE)).unwrap();

        let loaded = AppConfig::load(Some(dir.path())).unwrap();
        assert_eq!(loaded.source_suffixes, vec![".rst".to_string()]);
    }

    #[test]
    fn test_is_source_file() {
        let config = AppConfig::default();
        assert!(config.is_source_file(Path::new("docs/index.md")));
        assert!(config.is_source_file(Path::new("reference/commands.rst")));
        assert!(!config.is_source_file(Path::new("conf.py")));
        assert!(!config.is_source_file(Path::new(".md")));
    }
}
