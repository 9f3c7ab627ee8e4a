//! Configuration management for the Barked bridge
//!
//! Two kinds of configuration live here:
//!
//! - [`BridgeConfig`]: settings for this crate (script/interpreter search
//!   lists, overlap policy, directory overrides), loaded by [`loader`]
//! - [`schedule::ScheduleConfig`]: the scheduled-clean record shared with
//!   the barked script
//!
//! [`BarkedPaths`] resolves every per-user location the bridge touches.

pub mod loader;
pub mod schedule;

pub use loader::{ConfigFormat, ConfigLoader};
pub use schedule::{Frequency, ScheduleConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::platform::{PathOps, Platform};

/// Main configuration structure for the bridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Where to look for the script and its interpreter
    pub locator: LocatorConfig,

    /// Allow a new run while another is still live
    pub allow_overlap: bool,

    /// Overrides `~/.config/barked`
    pub config_dir: Option<PathBuf>,

    /// Overrides `~/Library/LaunchAgents`
    pub launch_agents_dir: Option<PathBuf>,

    /// Overrides `~/Library/Logs`
    pub logs_dir: Option<PathBuf>,
}

/// Candidate lists for script and interpreter resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Script locations, in priority order (`~/` is expanded)
    pub script_candidates: Vec<PathBuf>,

    /// Used when no candidate and no bundled copy is found
    pub script_fallback: PathBuf,

    /// Bash locations, in priority order
    pub interpreter_candidates: Vec<PathBuf>,

    /// Used when no interpreter candidate is executable
    pub interpreter_fallback: PathBuf,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            script_candidates: vec![
                PathBuf::from("/usr/local/bin/barked"),
                PathBuf::from("~/.local/bin/barked"),
            ],
            script_fallback: PathBuf::from("/usr/local/bin/barked"),
            // Homebrew bash first: the script needs Bash 4+
            interpreter_candidates: vec![
                PathBuf::from("/opt/homebrew/bin/bash"),
                PathBuf::from("/usr/local/bin/bash"),
            ],
            interpreter_fallback: PathBuf::from("/bin/bash"),
        }
    }
}

/// Per-user locations used by the bridge and the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarkedPaths {
    /// `~/.config/barked`
    pub config_dir: PathBuf,
    /// `~/Library/LaunchAgents`
    pub launch_agents_dir: PathBuf,
    /// `~/Library/Logs`
    pub logs_dir: PathBuf,
}

impl BarkedPaths {
    /// Resolve locations from the platform, honouring config overrides
    pub fn resolve(config: &BridgeConfig) -> Result<Self> {
        Self::resolve_with(config, Platform::paths().as_ref())
    }

    pub fn resolve_with(config: &BridgeConfig, paths: &dyn PathOps) -> Result<Self> {
        let config_dir = match &config.config_dir {
            Some(dir) => dir.clone(),
            None => paths.config_dir()?.join("barked"),
        };
        let launch_agents_dir = match &config.launch_agents_dir {
            Some(dir) => dir.clone(),
            None => paths.launch_agents_dir()?,
        };
        let logs_dir = match &config.logs_dir {
            Some(dir) => dir.clone(),
            None => paths.logs_dir()?,
        };
        Ok(Self {
            config_dir,
            launch_agents_dir,
            logs_dir,
        })
    }

    /// Everything under one root directory
    pub fn under(root: &Path) -> Self {
        Self {
            config_dir: root.join(".config").join("barked"),
            launch_agents_dir: root.join("Library").join("LaunchAgents"),
            logs_dir: root.join("Library").join("Logs"),
        }
    }

    pub fn schedule_file(&self) -> PathBuf {
        self.config_dir.join("scheduled-clean.json")
    }

    pub fn monitor_conf(&self) -> PathBuf {
        self.config_dir.join("monitor.conf")
    }

    pub fn monitor_state_dir(&self) -> PathBuf {
        self.config_dir.join("state")
    }

    pub fn baselines_dir(&self) -> PathBuf {
        self.config_dir.join("baselines")
    }

    pub fn plist_path(&self, label: &str) -> PathBuf {
        self.launch_agents_dir.join(format!("{}.plist", label))
    }
}
