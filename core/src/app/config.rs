//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for catalog settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mapdeck_shared::{DEFAULT_MAX_WAIT_SECS, MAPS_FOLDER};

use crate::library::{MapRootsProvider, ScanOptions};

/// Application configuration.
///
/// Contains all user-configurable settings organized into sections.
/// Serialized to/from TOML format for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where to look for maps
    #[serde(default)]
    pub paths: PathsConfig,
    /// Scan tuning
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Map root folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Installation root; default maps live in `<root_dir>/maps` (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
    /// User maps folder, scanned before the default one (default: `<data_dir>/maps`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_maps_dir: Option<PathBuf>,
}

/// Scan behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Seconds to wait for in-flight sources before returning partial results (default: 300)
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
    /// Worker thread override (default: half the available cores, at least one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
    /// Ask before deleting corrupt map archives (default: true)
    #[serde(default = "default_true")]
    pub prompt_on_corrupt: bool,
}

fn default_max_wait_secs() -> u64 {
    DEFAULT_MAX_WAIT_SECS
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: default_max_wait_secs(),
            worker_threads: None,
            prompt_on_corrupt: default_true(),
        }
    }
}

impl Config {
    /// Folder holding the maps that ship with the installation.
    pub fn default_maps_dir(&self) -> PathBuf {
        self.paths
            .root_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(MAPS_FOLDER)
    }

    /// Folder holding maps the user downloaded.
    pub fn user_maps_dir(&self) -> Option<PathBuf> {
        self.paths
            .user_maps_dir
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join(MAPS_FOLDER)))
    }

    /// Scan options derived from the `[scan]` section.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_wait: Duration::from_secs(self.scan.max_wait_secs),
            workers: self.scan.worker_threads.filter(|&n| n > 0),
            prompt_on_corrupt: self.scan.prompt_on_corrupt,
        }
    }
}

impl MapRootsProvider for Config {
    fn user_maps_dir(&self) -> Option<PathBuf> {
        Config::user_maps_dir(self)
    }

    fn default_maps_dir(&self) -> Option<PathBuf> {
        Some(Config::default_maps_dir(self))
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Mapdeck\config`
/// On macOS: `~/Library/Application Support/io.mapdeck.Mapdeck`
/// On Linux: `~/.config/mapdeck`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.mapdeck", "", "Mapdeck")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
///
/// The user maps folder lives here unless configured otherwise.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.mapdeck", "", "Mapdeck")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path of `config.toml`, if a config directory exists on this platform.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_path()
        .and_then(|path| load_from(&path).ok())
        .unwrap_or_default()
}

/// Loads the configuration from a specific file, reporting any failure.
pub fn load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Saves the configuration to a specific file, creating its directory if
/// needed.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))
}
