//! Configuration File Loading
//!
//! Finds the bridge configuration in the usual locations, falls back to
//! defaults when none exists, and saves in TOML or JSON by extension.

use super::BridgeConfig;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "BARKED_BRIDGE_CONFIG";

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files (without extension)
    search_paths: Vec<PathBuf>,
    /// Supported configuration file formats
    supported_formats: Vec<ConfigFormat>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }

    /// Format implied by a file extension; anything unknown is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
            current_path: None,
        }
    }

    /// Load configuration, falling back to defaults when none is found
    pub fn load() -> Result<BridgeConfig> {
        let mut loader = Self::new();
        Ok(loader.load_or_default())
    }

    /// Load from an explicit file; missing or malformed files are errors
    pub fn load_from_path(path: &Path) -> Result<BridgeConfig> {
        if !path.exists() {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }
        Self::load_config_file(path, ConfigFormat::from_path(path))
    }

    /// First configuration found in the search paths, or defaults
    pub fn load_or_default(&mut self) -> BridgeConfig {
        match self.find_and_load_config() {
            Some((path, config)) => {
                info!("Loaded configuration from {}", path.display());
                self.current_path = Some(path);
                config
            }
            None => {
                debug!("No configuration file found, using defaults");
                BridgeConfig::default()
            }
        }
    }

    /// Save configuration to the current path or default location
    pub fn save(&self, config: &BridgeConfig) -> Result<PathBuf> {
        let path = match &self.current_path {
            Some(path) => path.clone(),
            None => Self::get_default_config_path()?,
        };
        self.save_to_path(config, &path)?;
        Ok(path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config: &BridgeConfig, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigSaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        // Determine format from file extension
        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content).map_err(|e| Error::ConfigSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Find and load configuration from search paths
    fn find_and_load_config(&self) -> Option<(PathBuf, BridgeConfig)> {
        for path in &self.search_paths {
            for format in &self.supported_formats {
                let config_path = Self::get_config_path_for_format(path, *format);

                if config_path.exists() {
                    match Self::load_config_file(&config_path, *format) {
                        Ok(config) => return Some((config_path, config)),
                        Err(e) => {
                            // Log warning but continue searching
                            warn!("Failed to load config from {}: {}", config_path.display(), e);
                            continue;
                        }
                    }
                }
            }
        }

        None
    }

    /// Load a specific configuration file
    fn load_config_file(path: &Path, format: ConfigFormat) -> Result<BridgeConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Get configuration file path for a specific format
    fn get_config_path_for_format(base_path: &Path, format: ConfigFormat) -> PathBuf {
        if base_path.extension().is_some() {
            return base_path.to_path_buf();
        }
        base_path.with_extension(format.extension())
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        use crate::platform::Platform;

        let mut paths = Vec::new();

        // Explicit override
        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            if !explicit.is_empty() {
                paths.push(PathBuf::from(explicit));
            }
        }

        let path_ops = Platform::paths();
        if let Ok(config_dir) = path_ops.config_dir() {
            paths.push(config_dir.join("barked").join("bridge"));
        }

        // Home directory fallback
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".barked").join("bridge"));
        }

        paths
    }

    /// Get the default configuration path
    fn get_default_config_path() -> Result<PathBuf> {
        use crate::platform::Platform;

        Ok(Platform::paths()
            .config_dir()?
            .join("barked")
            .join("bridge.toml"))
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Add a custom search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    /// Clear all search paths and add a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
