use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chart::DEFAULT_BAR_HEIGHT_PX;
use crate::feed::FeedKind;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Endpoint path for each feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_people_path")]
    pub people: String,
    #[serde(default = "default_frequencies_path")]
    pub frequencies: String,
    #[serde(default = "default_duplicates_path")]
    pub duplicates: String,
}

fn default_people_path() -> String {
    FeedKind::People.default_path().to_string()
}

fn default_frequencies_path() -> String {
    FeedKind::Frequencies.default_path().to_string()
}

fn default_duplicates_path() -> String {
    FeedKind::Duplicates.default_path().to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            people: default_people_path(),
            frequencies: default_frequencies_path(),
            duplicates: default_duplicates_path(),
        }
    }
}

impl Endpoints {
    pub fn path(&self, kind: FeedKind) -> &str {
        match kind {
            FeedKind::People => &self.people,
            FeedKind::Frequencies => &self.frequencies,
            FeedKind::Duplicates => &self.duplicates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Fixed bar height in pixels
    #[serde(default = "default_bar_height")]
    pub bar_height: u32,
}

fn default_bar_height() -> u32 {
    DEFAULT_BAR_HEIGHT_PX
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            bar_height: default_bar_height(),
        }
    }
}

/// Optional color overrides as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the feed endpoints live
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fetch every feed when the dashboard starts
    #[serde(default = "default_autoload")]
    pub autoload: bool,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_autoload() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            autoload: default_autoload(),
            endpoints: Endpoints::default(),
            chart: ChartConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("feedboard");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it with defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from `path`; a missing file is written with defaults and a
    /// broken one is ignored with a warning
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
            }
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::debug!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}
