use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// default number of commits shown per page
pub const DEFAULT_MAX_COMMITS: usize = 5;

/// default tracked ref
pub const DEFAULT_TIP: &str = "main";

/// repository configuration stored in config.toml
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// settings for generated pages
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

/// the `[site]` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// page title, defaults to the repository directory name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// one-line description shown under the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// url advertised for cloning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,
    /// commits listed per page
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,
    /// ref whose tip is published
    #[serde(default = "default_tip")]
    pub tip: String,
    /// executable turning README text (stdin) into HTML (stdout)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_command: Option<PathBuf>,
}

fn default_max_commits() -> usize {
    DEFAULT_MAX_COMMITS
}

fn default_tip() -> String {
    DEFAULT_TIP.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            clone_url: None,
            max_commits: DEFAULT_MAX_COMMITS,
            tip: default_tip(),
            readme_command: None,
        }
    }
}

impl SiteConfig {
    /// configured title, or one derived from the repository path
    pub fn title_for(&self, repo_path: &Path) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        store_name(repo_path)
    }
}

/// directory name with a trailing ".zub" removed
pub(crate) fn store_name(path: &Path) -> String {
    let name = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    match name.rfind(".zub") {
        Some(ext) if ext > 0 => name[..ext].to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config {
            site: SiteConfig {
                title: Some("project".to_string()),
                description: Some("a small project".to_string()),
                clone_url: Some("ssh://server/project.zub".to_string()),
                max_commits: 10,
                tip: "release".to_string(),
                readme_command: Some(PathBuf::from("/usr/bin/render-readme")),
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site, SiteConfig::default());
        assert_eq!(config.site.max_commits, DEFAULT_MAX_COMMITS);
        assert_eq!(config.site.tip, "main");
    }

    #[test]
    fn test_config_partial_site_table() {
        let toml_str = r#"
[site]
description = "docs"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.site.description.as_deref(), Some("docs"));
        assert_eq!(config.site.max_commits, DEFAULT_MAX_COMMITS);
        assert!(config.site.clone_url.is_none());
    }

    #[test]
    fn test_title_strips_zub_suffix() {
        let site = SiteConfig::default();
        assert_eq!(site.title_for(Path::new("/nonexistent/project.zub")), "project");
        assert_eq!(site.title_for(Path::new("/nonexistent/plain")), "plain");
        assert_eq!(site.title_for(Path::new("/nonexistent/.zub")), ".zub");
    }

    #[test]
    fn test_title_prefers_configured() {
        let site = SiteConfig {
            title: Some("named".to_string()),
            ..SiteConfig::default()
        };
        assert_eq!(site.title_for(Path::new("/nonexistent/project.zub")), "named");
    }
}
