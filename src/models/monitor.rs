//! Monitor daemon settings and status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed state of the monitor launch agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DaemonStatus {
    NotInstalled,
    Running,
    Stopped,
    #[default]
    Unknown,
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DaemonStatus::NotInstalled => "Not Installed",
            DaemonStatus::Running => "Running",
            DaemonStatus::Stopped => "Stopped",
            DaemonStatus::Unknown => "Unknown",
        };
        f.write_str(text)
    }
}

/// When launchd should start the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// Always on login
    #[default]
    Always,
    /// Only on AC power (the script enforces this)
    AcPower,
    /// Never started automatically
    Manual,
}

impl StartMode {
    pub fn config_value(&self) -> &'static str {
        match self {
            StartMode::Always => "always",
            StartMode::AcPower => "ac_power",
            StartMode::Manual => "manual",
        }
    }

    pub fn runs_at_load(&self) -> bool {
        !matches!(self, StartMode::Manual)
    }
}

/// Polling interval of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonitorInterval {
    OneMinute,
    #[default]
    FiveMinutes,
    FifteenMinutes,
}

impl MonitorInterval {
    pub fn seconds(&self) -> u32 {
        match self {
            MonitorInterval::OneMinute => 60,
            MonitorInterval::FiveMinutes => 300,
            MonitorInterval::FifteenMinutes => 900,
        }
    }
}

/// Lowest severity that raises an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertSeverity {
    #[default]
    WarningAndCritical,
    CriticalOnly,
}

impl AlertSeverity {
    pub fn config_value(&self) -> &'static str {
        match self {
            AlertSeverity::WarningAndCritical => "warning",
            AlertSeverity::CriticalOnly => "critical",
        }
    }
}

/// Choices made when installing the monitor daemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub start_mode: StartMode,
    pub interval: MonitorInterval,
    pub severity: AlertSeverity,
    /// Run `--monitor --baseline` before registering the agent
    pub create_baseline: bool,
}
