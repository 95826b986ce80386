//! Configuration: loading thresholds, page sizes, and the config file manager.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Thresholds that drive the access-plan decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoadingConfig {
    /// Files at or under this row count load eagerly.
    pub full_load_threshold: usize,
    /// Files over this row count default to a random sample.
    pub sample_threshold: usize,
    /// Rows drawn when a sample is requested.
    pub sample_size: usize,
    /// Rows used for statistics under row-group streaming (capped window).
    pub stats_row_cap: usize,
    /// Byte cap for uploaded streams.
    pub max_upload_bytes: u64,
}

impl Default for FileLoadingConfig {
    fn default() -> Self {
        Self {
            full_load_threshold: 100_000,
            sample_threshold: 1_000_000,
            sample_size: 10_000,
            stats_row_cap: 10_000,
            max_upload_bytes: 20 * 1024 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Default rows per page.
    pub page_size: usize,
    /// Page sizes offered by a front end.
    pub page_size_options: Vec<usize>,
    /// Upper bound (pixels) for image thumbnails rendered by a front end.
    pub thumbnail_max_px: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            page_size_options: vec![50, 100, 200, 500],
            thumbnail_max_px: 200,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub file_loading: FileLoadingConfig,
    pub display: DisplayConfig,
}

/// Manages the config directory and loads `config.toml` from it.
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Load the config file; defaults when it does not exist. A present but
    /// malformed file is an error rather than a silent fallback.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_file();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&raw)
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Write the default config (with all values spelled out) for editing.
    pub fn write_default(&self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config_dir)?;
        let path = self.config_file();
        let toml_str = toml::to_string_pretty(&AppConfig::default())?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }
}
