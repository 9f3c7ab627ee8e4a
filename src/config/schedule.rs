//! Scheduled clean record
//!
//! `~/.config/barked/scheduled-clean.json` is shared with the barked
//! script, which reads it when launchd fires `--clean-scheduled`.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::CleanCategory;

/// Version string written into new records
pub const SCHEDULE_FORMAT_VERSION: &str = "1.0";

/// How often the scheduled clean runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub fn id(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(Error::UnknownIdentifier {
                kind: "schedule frequency".to_string(),
                id: s.to_string(),
            }),
        }
    }
}

/// The scheduled-clean record
///
/// The script writes this file too, so every field is read on its own: a
/// null or mistyped value falls back to that field's default instead of
/// discarding the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default, deserialize_with = "or_default")]
    pub enabled: bool,

    /// `daily`, `weekly`, `custom` or anything the script wrote
    #[serde(default, deserialize_with = "or_default")]
    pub schedule: String,

    #[serde(default, deserialize_with = "or_default")]
    pub custom_interval: String,

    /// Category ids in catalog order
    #[serde(default, deserialize_with = "or_default")]
    pub categories: Vec<String>,

    #[serde(default = "default_notify", deserialize_with = "notify_or_default")]
    pub notify: bool,

    #[serde(default, deserialize_with = "or_default")]
    pub last_run: String,

    #[serde(default = "default_version", deserialize_with = "version_or_default")]
    pub version: String,
}

fn default_notify() -> bool {
    true
}

fn default_version() -> String {
    SCHEDULE_FORMAT_VERSION.to_string()
}

fn or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn notify_or_default<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_bool()
        .unwrap_or_else(default_notify))
}

fn version_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(default_version))
}

impl ScheduleConfig {
    /// A fresh, enabled record
    pub fn new(frequency: Frequency, categories: &[CleanCategory]) -> Self {
        Self {
            enabled: true,
            schedule: frequency.id().to_string(),
            custom_interval: String::new(),
            categories: CleanCategory::ALL
                .iter()
                .filter(|category| categories.contains(category))
                .map(|category| category.id().to_string())
                .collect(),
            notify: default_notify(),
            last_run: String::new(),
            version: default_version(),
        }
    }

    /// Read the record; a missing or unreadable file yields `None`
    pub fn read(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read schedule config {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring malformed schedule config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the record as pretty JSON, creating the directory if needed
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigSaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| Error::ConfigSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Wrote schedule config to {}", path.display());
        Ok(())
    }

    /// Categories as typed values; unknown ids are skipped
    pub fn clean_categories(&self) -> Vec<CleanCategory> {
        self.categories
            .iter()
            .filter_map(|id| CleanCategory::from_id(id))
            .collect()
    }
}

/// One-line summary of the schedule at `path`
pub fn display_text(path: &Path) -> String {
    display_text_for(ScheduleConfig::read(path).as_ref())
}

pub fn display_text_for(config: Option<&ScheduleConfig>) -> String {
    match config {
        Some(config) if config.enabled => match config.schedule.as_str() {
            "daily" => "Scheduled: Daily".to_string(),
            "weekly" => "Scheduled: Weekly".to_string(),
            "custom" => "Scheduled: Custom".to_string(),
            other => format!("Scheduled: {}", other),
        },
        _ => "No schedule configured".to_string(),
    }
}
