//! Platform-specific operation traits

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Platform-specific signal operations
#[async_trait::async_trait]
pub trait SignalOps: Send + Sync {
    /// Send a termination signal (cooperative shutdown, never a kill)
    async fn send_terminate(&self, pid: u32) -> Result<()>;

    /// Check if a process is still running
    fn is_process_running(&self, pid: u32) -> bool;
}

/// Platform-specific filesystem operations
pub trait FilesystemOps: Send + Sync {
    /// Check if a path is a regular file with an execute bit set
    fn is_executable(&self, path: &Path) -> bool;
}

/// Per-user directories the bridge reads and writes
pub trait PathOps: Send + Sync {
    /// The user's home directory
    fn home_dir(&self) -> Result<PathBuf>;

    /// Base configuration directory (`~/.config` unless overridden)
    fn config_dir(&self) -> Result<PathBuf>;

    /// Directory holding per-user launchd agents
    fn launch_agents_dir(&self) -> Result<PathBuf> {
        Ok(self.home_dir()?.join("Library").join("LaunchAgents"))
    }

    /// Directory for scheduled job logs
    fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.home_dir()?.join("Library").join("Logs"))
    }
}
