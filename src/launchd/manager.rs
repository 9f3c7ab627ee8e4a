//! Service manager access
//!
//! `launchctl` is driven through the [`ServiceManager`] trait so agent
//! installation and status probing can be exercised without launchd.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use super::plist::LaunchAgent;
use crate::error::{Error, Result};
use crate::models::DaemonStatus;

/// Default location of launchctl
pub const LAUNCHCTL_PATH: &str = "/bin/launchctl";

/// Captured result of `launchctl list <label>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceListing {
    pub output: String,
    pub exit_code: i32,
}

/// Operations on the per-user service manager
#[async_trait::async_trait]
pub trait ServiceManager: Send + Sync {
    /// Unload the job described by `plist`; returns the exit code
    async fn unload(&self, plist: &Path) -> Result<i32>;

    /// Load the job described by `plist`; returns the exit code
    async fn load(&self, plist: &Path) -> Result<i32>;

    /// Query a loaded job by label
    async fn list(&self, label: &str) -> Result<ServiceListing>;
}

/// `launchctl`-backed service manager
#[derive(Debug, Clone)]
pub struct Launchctl {
    program: PathBuf,
}

impl Launchctl {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(LAUNCHCTL_PATH),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn status_of(&self, verb: &str, plist: &Path) -> Result<i32> {
        let status = tokio::process::Command::new(&self.program)
            .arg(verb)
            .arg(plist)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| Error::ServiceManagerUnavailable {
                reason: format!("{}: {}", self.program.display(), e),
            })?;
        Ok(status.code().unwrap_or(1))
    }
}

impl Default for Launchctl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ServiceManager for Launchctl {
    async fn unload(&self, plist: &Path) -> Result<i32> {
        self.status_of("unload", plist).await
    }

    async fn load(&self, plist: &Path) -> Result<i32> {
        self.status_of("load", plist).await
    }

    async fn list(&self, label: &str) -> Result<ServiceListing> {
        let output = tokio::process::Command::new(&self.program)
            .arg("list")
            .arg(label)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::ServiceManagerUnavailable {
                reason: format!("{}: {}", self.program.display(), e),
            })?;
        Ok(ServiceListing {
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code().unwrap_or(1),
        })
    }
}

/// Replace any existing job and register `agent` from `plist_path`
///
/// Sequence: unload (result ignored), write the descriptor atomically,
/// load. A non-zero load is an error.
pub async fn install_agent(
    manager: &dyn ServiceManager,
    agent: &LaunchAgent,
    plist_path: &Path,
) -> Result<()> {
    if let Some(parent) = plist_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::DescriptorWriteFailed {
            path: plist_path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    match manager.unload(plist_path).await {
        Ok(code) => debug!("Unloaded {} (exit {})", agent.label, code),
        Err(e) => debug!("Ignoring unload failure for {}: {}", agent.label, e),
    }

    write_atomically(plist_path, agent.to_plist().as_bytes(), None).map_err(|e| {
        Error::DescriptorWriteFailed {
            path: plist_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let code = manager.load(plist_path).await?;
    if code != 0 {
        error!("launchctl load of {} exited with {}", agent.label, code);
        return Err(Error::ServiceLoadFailed {
            label: agent.label.clone(),
            reason: format!("exit code {}", code),
        });
    }

    info!("Installed launch agent {} at {}", agent.label, plist_path.display());
    Ok(())
}

/// Unload a job and delete its descriptor; a missing file is not an error
pub async fn uninstall_agent(manager: &dyn ServiceManager, plist_path: &Path) -> Result<()> {
    if let Err(e) = manager.unload(plist_path).await {
        debug!("Ignoring unload failure for {}: {}", plist_path.display(), e);
    }
    match std::fs::remove_file(plist_path) {
        Ok(()) => {
            info!("Removed launch agent {}", plist_path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::DescriptorWriteFailed {
            path: plist_path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Probe whether the job from `plist_path` is running
pub async fn daemon_status(
    manager: &dyn ServiceManager,
    label: &str,
    plist_path: &Path,
) -> DaemonStatus {
    if !plist_path.exists() {
        return DaemonStatus::NotInstalled;
    }
    match manager.list(label).await {
        Ok(listing) => status_from_listing(&listing),
        Err(e) => {
            warn!("Could not query {}: {}", label, e);
            DaemonStatus::Unknown
        }
    }
}

/// Interpret `launchctl list <label>` output
pub fn status_from_listing(listing: &ServiceListing) -> DaemonStatus {
    let first_line = listing.output.lines().next().unwrap_or_default();
    if first_line.contains("PID")
        || (listing.exit_code == 0 && !listing.output.contains("\"PID\" = 0;"))
    {
        DaemonStatus::Running
    } else {
        DaemonStatus::Stopped
    }
}

/// Write through a sibling temporary file and rename into place
pub(crate) fn write_atomically(path: &Path, contents: &[u8], mode: Option<u32>) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let result = (|| {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        if let Some(mode) = mode {
            options.mode(mode);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}
