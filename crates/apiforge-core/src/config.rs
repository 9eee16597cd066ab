use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration, read from `config.json` in the XDG config directory.
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when `APIFORGE_LOG` is not set (e.g. "info", "debug").
    pub log_level: String,
    /// Open every action read-only (no row appends, no edits).
    pub read_only: bool,
    /// Tab shown for forms that have no stored selection (e.g. "BODY").
    pub default_tab: Option<String>,
    /// Seed demo actions into an empty database on startup.
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            read_only: false,
            default_tab: None,
            seed_demo: true,
        }
    }
}

impl Config {
    /// Load the config from its default location.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        Self::load_from(&path)
    }

    /// Load the config from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config at {}", path.display()))
    }

    /// Parse a JSON config document.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "apiforge").context("Could not determine data directory")
}

/// Returns the path to the config file.
/// Location: `~/.config/apiforge/config.json`
pub fn config_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    Ok(dirs.config_dir().join("config.json"))
}
