//! Monitor daemon installation
//!
//! Installing writes `monitor.conf` for the script, optionally records a
//! baseline, and registers the `com.barked.monitor` agent. Uninstalling
//! removes the agent and marks the configuration as not installed.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::Path;

use super::manager::{daemon_status, install_agent, uninstall_agent, write_atomically, ServiceManager};
use super::plist::{LaunchAgent, MONITOR_LABEL};
use crate::bridge::ScriptBridge;
use crate::config::BarkedPaths;
use crate::error::{Error, Result};
use crate::models::{DaemonStatus, ExecutionSession, Invocation, MonitorAction, MonitorSettings};

/// Categories the daemon watches
pub const MONITOR_CATEGORIES: &str = "network,supply-chain,cloud-sync,dev-env";

/// Seconds between repeated alerts for the same finding
pub const ALERT_COOLDOWN_SECS: u32 = 3600;

const INSTALLED_FLAG: &str = "DAEMON_INSTALLED=true";
const UNINSTALLED_FLAG: &str = "DAEMON_INSTALLED=false";

/// Render `monitor.conf` for the given settings
pub fn render_monitor_conf(settings: &MonitorSettings, generated: DateTime<Utc>) -> String {
    format!(
        r#"# Barked Monitor Configuration
# Generated: {generated}

# Daemon settings
DAEMON_ENABLED=true
DAEMON_START_MODE="{start_mode}"
{installed}

# Monitor settings
MONITOR_INTERVAL={interval}
MONITOR_CATEGORIES="{categories}"

# Alert channels
ALERT_MACOS_NOTIFY=true
ALERT_LINUX_NOTIFY=true
ALERT_WEBHOOK_URL=""

# Email (configure manually if needed)
ALERT_EMAIL_ENABLED=false
ALERT_EMAIL_API_URL=""
ALERT_EMAIL_API_KEY=""
ALERT_EMAIL_TO=""

# Alert behavior
ALERT_COOLDOWN={cooldown}
ALERT_SEVERITY_MIN="{severity}"

# Notification detail
NOTIFY_SHOW_IMPACT=true
NOTIFY_SHOW_REMEDIATION=true
NOTIFY_MACOS_CLICK_ACTION="log"
"#,
        generated = generated.to_rfc3339_opts(SecondsFormat::Secs, true),
        start_mode = settings.start_mode.config_value(),
        installed = INSTALLED_FLAG,
        interval = settings.interval.seconds(),
        categories = MONITOR_CATEGORIES,
        cooldown = ALERT_COOLDOWN_SECS,
        severity = settings.severity.config_value(),
    )
}

/// Install and register the monitor daemon
///
/// Returns the baseline session when one was requested. A failed baseline
/// is logged and does not stop the install.
pub async fn install_monitor(
    bridge: &ScriptBridge,
    manager: &dyn ServiceManager,
    paths: &BarkedPaths,
    settings: &MonitorSettings,
) -> Result<Option<ExecutionSession>> {
    // Refuse before anything is written if the baseline run could not start
    if settings.create_baseline {
        bridge.check_overlap()?;
    }

    for dir in [
        paths.config_dir.clone(),
        paths.monitor_state_dir(),
        paths.baselines_dir(),
        paths.launch_agents_dir.clone(),
    ] {
        fs::create_dir_all(&dir).map_err(|e| Error::ConfigSaveFailed {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
    }

    let conf_path = paths.monitor_conf();
    let conf = render_monitor_conf(settings, Utc::now());
    write_atomically(&conf_path, conf.as_bytes(), Some(0o600)).map_err(|e| {
        Error::ConfigSaveFailed {
            path: conf_path.clone(),
            reason: e.to_string(),
        }
    })?;
    debug!("Wrote {}", conf_path.display());

    let baseline = if settings.create_baseline {
        match bridge.run(Invocation::monitor(MonitorAction::Baseline)).await {
            Ok(session) => {
                if !session.succeeded() {
                    warn!(
                        "Baseline run exited with {:?}; continuing with install",
                        session.exit_code()
                    );
                }
                Some(session)
            }
            Err(e) => {
                warn!("Baseline run rejected: {}; continuing with install", e);
                None
            }
        }
    } else {
        None
    };

    let locator = bridge.locator();
    let agent = LaunchAgent::monitor(
        &locator.resolve_interpreter(),
        &locator.resolve_script(),
        settings.start_mode,
        paths,
    );
    install_agent(manager, &agent, &paths.plist_path(MONITOR_LABEL)).await?;

    Ok(baseline)
}

/// Remove the monitor agent and flag the configuration as uninstalled
pub async fn uninstall_monitor(manager: &dyn ServiceManager, paths: &BarkedPaths) -> Result<()> {
    uninstall_agent(manager, &paths.plist_path(MONITOR_LABEL)).await?;
    mark_uninstalled(&paths.monitor_conf())
}

/// Current state of the monitor daemon
pub async fn monitor_status(manager: &dyn ServiceManager, paths: &BarkedPaths) -> DaemonStatus {
    daemon_status(manager, MONITOR_LABEL, &paths.plist_path(MONITOR_LABEL)).await
}

fn mark_uninstalled(conf_path: &Path) -> Result<()> {
    let contents = match fs::read_to_string(conf_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::ConfigLoadFailed {
                path: conf_path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };
    if !contents.contains(INSTALLED_FLAG) {
        return Ok(());
    }

    let updated = contents.replace(INSTALLED_FLAG, UNINSTALLED_FLAG);
    write_atomically(conf_path, updated.as_bytes(), Some(0o600)).map_err(|e| {
        Error::ConfigSaveFailed {
            path: conf_path.to_path_buf(),
            reason: e.to_string(),
        }
    })
}
