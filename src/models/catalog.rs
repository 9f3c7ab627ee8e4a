//! Catalog of script identifiers
//!
//! Clean categories, hardening modules, profiles and monitor actions are
//! closed sets shared with the barked script. Each enum maps exhaustively
//! to the identifier the script expects and to a display name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Cleanup category understood by `--clean-cats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanCategory {
    SystemCaches,
    UserCaches,
    BrowserData,
    PrivacyTraces,
    DevCruft,
    TrashDownloads,
    MailMessages,
}

impl CleanCategory {
    /// All categories in display order
    pub const ALL: [CleanCategory; 7] = [
        CleanCategory::SystemCaches,
        CleanCategory::UserCaches,
        CleanCategory::BrowserData,
        CleanCategory::PrivacyTraces,
        CleanCategory::DevCruft,
        CleanCategory::TrashDownloads,
        CleanCategory::MailMessages,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CleanCategory::SystemCaches => "system-caches",
            CleanCategory::UserCaches => "user-caches",
            CleanCategory::BrowserData => "browser-data",
            CleanCategory::PrivacyTraces => "privacy-traces",
            CleanCategory::DevCruft => "dev-cruft",
            CleanCategory::TrashDownloads => "trash-downloads",
            CleanCategory::MailMessages => "mail-messages",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CleanCategory::SystemCaches => "System Caches & Logs",
            CleanCategory::UserCaches => "User Caches & Logs",
            CleanCategory::BrowserData => "Browser Data",
            CleanCategory::PrivacyTraces => "Privacy Traces",
            CleanCategory::DevCruft => "Developer Cruft",
            CleanCategory::TrashDownloads => "Trash & Downloads",
            CleanCategory::MailMessages => "Mail & Messages",
        }
    }

    /// Individual targets the script cleans for this category
    pub fn targets(&self) -> &'static [&'static str] {
        match self {
            CleanCategory::SystemCaches => {
                &["system-cache", "system-logs", "diagnostic-reports", "dns-cache"]
            }
            CleanCategory::UserCaches => &["user-cache", "user-logs", "saved-app-state"],
            CleanCategory::BrowserData => &["safari", "chrome", "firefox", "arc", "edge"],
            CleanCategory::PrivacyTraces => &[
                "recent-items",
                "quicklook-thumbs",
                "ds-store",
                "clipboard",
                "search-metadata",
            ],
            CleanCategory::DevCruft => &[
                "xcode-derived",
                "homebrew-cache",
                "npm-cache",
                "yarn-cache",
                "pip-cache",
                "cargo-cache",
                "go-cache",
                "cocoapods-cache",
                "docker-cruft",
                "ide-caches",
            ],
            CleanCategory::TrashDownloads => &["trash", "old-downloads"],
            CleanCategory::MailMessages => &["mail-cache", "messages-attachments"],
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl FromStr for CleanCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim()).ok_or_else(|| Error::UnknownIdentifier {
            kind: "clean category".to_string(),
            id: s.to_string(),
        })
    }
}

impl fmt::Display for CleanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Heading under which hardening modules are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleGroup {
    DiskBoot,
    Firewall,
    NetworkDns,
    Privacy,
    Browser,
    AccessControl,
    DevTools,
    AuthSsh,
    Monitoring,
    Maintenance,
    Advanced,
}

impl ModuleGroup {
    /// Groups in display order
    pub const ORDER: [ModuleGroup; 11] = [
        ModuleGroup::DiskBoot,
        ModuleGroup::Firewall,
        ModuleGroup::NetworkDns,
        ModuleGroup::Privacy,
        ModuleGroup::Browser,
        ModuleGroup::AccessControl,
        ModuleGroup::DevTools,
        ModuleGroup::AuthSsh,
        ModuleGroup::Monitoring,
        ModuleGroup::Maintenance,
        ModuleGroup::Advanced,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleGroup::DiskBoot => "Disk & Boot",
            ModuleGroup::Firewall => "Firewall",
            ModuleGroup::NetworkDns => "Network & DNS",
            ModuleGroup::Privacy => "Privacy",
            ModuleGroup::Browser => "Browser",
            ModuleGroup::AccessControl => "Access Control",
            ModuleGroup::DevTools => "Dev Tools",
            ModuleGroup::AuthSsh => "Auth & SSH",
            ModuleGroup::Monitoring => "Monitoring",
            ModuleGroup::Maintenance => "Maintenance",
            ModuleGroup::Advanced => "Advanced",
        }
    }
}

/// Hardening module understood by `--modify --modules`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardenModule {
    DiskEncrypt,
    FirewallInbound,
    FirewallStealth,
    FirewallOutbound,
    DnsSecure,
    VpnKillswitch,
    HostnameScrub,
    MacRotate,
    TelemetryDisable,
    TrafficObfuscation,
    MetadataStrip,
    BrowserBasic,
    BrowserFingerprint,
    GuestDisable,
    LockScreen,
    BluetoothDisable,
    GitHarden,
    DevIsolation,
    SshHarden,
    MonitoringTools,
    PermissionsAudit,
    AuditScript,
    AutoUpdates,
    BackupGuidance,
    BorderPrep,
    KernelSysctl,
    ApparmorEnforce,
    BootSecurity,
}

impl HardenModule {
    /// All modules in display order
    pub const ALL: [HardenModule; 28] = [
        HardenModule::DiskEncrypt,
        HardenModule::FirewallInbound,
        HardenModule::FirewallStealth,
        HardenModule::FirewallOutbound,
        HardenModule::DnsSecure,
        HardenModule::VpnKillswitch,
        HardenModule::HostnameScrub,
        HardenModule::MacRotate,
        HardenModule::TelemetryDisable,
        HardenModule::TrafficObfuscation,
        HardenModule::MetadataStrip,
        HardenModule::BrowserBasic,
        HardenModule::BrowserFingerprint,
        HardenModule::GuestDisable,
        HardenModule::LockScreen,
        HardenModule::BluetoothDisable,
        HardenModule::GitHarden,
        HardenModule::DevIsolation,
        HardenModule::SshHarden,
        HardenModule::MonitoringTools,
        HardenModule::PermissionsAudit,
        HardenModule::AuditScript,
        HardenModule::AutoUpdates,
        HardenModule::BackupGuidance,
        HardenModule::BorderPrep,
        HardenModule::KernelSysctl,
        HardenModule::ApparmorEnforce,
        HardenModule::BootSecurity,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            HardenModule::DiskEncrypt => "disk-encrypt",
            HardenModule::FirewallInbound => "firewall-inbound",
            HardenModule::FirewallStealth => "firewall-stealth",
            HardenModule::FirewallOutbound => "firewall-outbound",
            HardenModule::DnsSecure => "dns-secure",
            HardenModule::VpnKillswitch => "vpn-killswitch",
            HardenModule::HostnameScrub => "hostname-scrub",
            HardenModule::MacRotate => "mac-rotate",
            HardenModule::TelemetryDisable => "telemetry-disable",
            HardenModule::TrafficObfuscation => "traffic-obfuscation",
            HardenModule::MetadataStrip => "metadata-strip",
            HardenModule::BrowserBasic => "browser-basic",
            HardenModule::BrowserFingerprint => "browser-fingerprint",
            HardenModule::GuestDisable => "guest-disable",
            HardenModule::LockScreen => "lock-screen",
            HardenModule::BluetoothDisable => "bluetooth-disable",
            HardenModule::GitHarden => "git-harden",
            HardenModule::DevIsolation => "dev-isolation",
            HardenModule::SshHarden => "ssh-harden",
            HardenModule::MonitoringTools => "monitoring-tools",
            HardenModule::PermissionsAudit => "permissions-audit",
            HardenModule::AuditScript => "audit-script",
            HardenModule::AutoUpdates => "auto-updates",
            HardenModule::BackupGuidance => "backup-guidance",
            HardenModule::BorderPrep => "border-prep",
            HardenModule::KernelSysctl => "kernel-sysctl",
            HardenModule::ApparmorEnforce => "apparmor-enforce",
            HardenModule::BootSecurity => "boot-security",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HardenModule::DiskEncrypt => "Disk Encryption",
            HardenModule::FirewallInbound => "Inbound Firewall",
            HardenModule::FirewallStealth => "Stealth Mode",
            HardenModule::FirewallOutbound => "Outbound Firewall",
            HardenModule::DnsSecure => "Encrypted DNS (Quad9)",
            HardenModule::VpnKillswitch => "VPN Kill Switch",
            HardenModule::HostnameScrub => "Hostname Scrub",
            HardenModule::MacRotate => "MAC Rotation",
            HardenModule::TelemetryDisable => "Telemetry Disable",
            HardenModule::TrafficObfuscation => "Traffic Obfuscation",
            HardenModule::MetadataStrip => "Metadata Stripping",
            HardenModule::BrowserBasic => "Basic Browser Hardening",
            HardenModule::BrowserFingerprint => "Fingerprint Resistance",
            HardenModule::GuestDisable => "Disable Guest Account",
            HardenModule::LockScreen => "Lock Screen",
            HardenModule::BluetoothDisable => "Disable Bluetooth",
            HardenModule::GitHarden => "Git Hardening",
            HardenModule::DevIsolation => "Dev Isolation",
            HardenModule::SshHarden => "SSH Hardening",
            HardenModule::MonitoringTools => "Monitoring Tools",
            HardenModule::PermissionsAudit => "Permissions Audit",
            HardenModule::AuditScript => "Weekly Audit Script",
            HardenModule::AutoUpdates => "Auto Updates",
            HardenModule::BackupGuidance => "Backup Guidance",
            HardenModule::BorderPrep => "Border Crossing Prep",
            HardenModule::KernelSysctl => "Kernel Hardening",
            HardenModule::ApparmorEnforce => "App Sandbox Enforce",
            HardenModule::BootSecurity => "Secure Boot / SIP",
        }
    }

    pub fn group(&self) -> ModuleGroup {
        match self {
            HardenModule::DiskEncrypt => ModuleGroup::DiskBoot,
            HardenModule::FirewallInbound
            | HardenModule::FirewallStealth
            | HardenModule::FirewallOutbound => ModuleGroup::Firewall,
            HardenModule::DnsSecure | HardenModule::VpnKillswitch | HardenModule::HostnameScrub => {
                ModuleGroup::NetworkDns
            }
            HardenModule::MacRotate
            | HardenModule::TelemetryDisable
            | HardenModule::TrafficObfuscation
            | HardenModule::MetadataStrip => ModuleGroup::Privacy,
            HardenModule::BrowserBasic | HardenModule::BrowserFingerprint => ModuleGroup::Browser,
            HardenModule::GuestDisable
            | HardenModule::LockScreen
            | HardenModule::BluetoothDisable => ModuleGroup::AccessControl,
            HardenModule::GitHarden | HardenModule::DevIsolation => ModuleGroup::DevTools,
            HardenModule::SshHarden => ModuleGroup::AuthSsh,
            HardenModule::MonitoringTools
            | HardenModule::PermissionsAudit
            | HardenModule::AuditScript => ModuleGroup::Monitoring,
            HardenModule::AutoUpdates | HardenModule::BackupGuidance | HardenModule::BorderPrep => {
                ModuleGroup::Maintenance
            }
            HardenModule::KernelSysctl
            | HardenModule::ApparmorEnforce
            | HardenModule::BootSecurity => ModuleGroup::Advanced,
        }
    }

    /// Modules bucketed by group, groups in display order, empty groups skipped
    pub fn grouped() -> Vec<(ModuleGroup, Vec<HardenModule>)> {
        ModuleGroup::ORDER
            .into_iter()
            .map(|group| {
                let modules = Self::ALL
                    .into_iter()
                    .filter(|m| m.group() == group)
                    .collect::<Vec<_>>();
                (group, modules)
            })
            .filter(|(_, modules)| !modules.is_empty())
            .collect()
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

impl FromStr for HardenModule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim()).ok_or_else(|| Error::UnknownIdentifier {
            kind: "hardening module".to_string(),
            id: s.to_string(),
        })
    }
}

impl fmt::Display for HardenModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Hardening profile applied with `--profile <name> --auto --yes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Standard,
    High,
    Paranoid,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Standard, Profile::High, Profile::Paranoid];

    pub fn id(&self) -> &'static str {
        match self {
            Profile::Standard => "standard",
            Profile::High => "high",
            Profile::Paranoid => "paranoid",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Profile::Standard => "Standard",
            Profile::High => "High",
            Profile::Paranoid => "Paranoid",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Profile::Standard => {
                "Encrypted disk, firewall, secure DNS, auto-updates, basic browser hardening"
            }
            Profile::High => {
                "Standard + outbound firewall, hostname scrubbing, monitoring tools, SSH hardening, telemetry disabled"
            }
            Profile::Paranoid => {
                "High + MAC rotation, traffic obfuscation, VPN kill switch, full audit system, metadata stripping, border crossing prep"
            }
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(&s.trim().to_lowercase()).ok_or_else(|| Error::UnknownIdentifier {
            kind: "profile".to_string(),
            id: s.to_string(),
        })
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Sub-action passed together with `--monitor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorAction {
    Install,
    Enable,
    Disable,
    Restart,
    Logs,
    Health,
    Uninstall,
    Daemon,
    Baseline,
}

impl MonitorAction {
    pub const ALL: [MonitorAction; 9] = [
        MonitorAction::Install,
        MonitorAction::Enable,
        MonitorAction::Disable,
        MonitorAction::Restart,
        MonitorAction::Logs,
        MonitorAction::Health,
        MonitorAction::Uninstall,
        MonitorAction::Daemon,
        MonitorAction::Baseline,
    ];

    pub fn flag(&self) -> &'static str {
        match self {
            MonitorAction::Install => "--install",
            MonitorAction::Enable => "--enable",
            MonitorAction::Disable => "--disable",
            MonitorAction::Restart => "--restart",
            MonitorAction::Logs => "--logs",
            MonitorAction::Health => "--health",
            MonitorAction::Uninstall => "--uninstall",
            MonitorAction::Daemon => "--daemon",
            MonitorAction::Baseline => "--baseline",
        }
    }
}

impl FromStr for MonitorAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches("--");
        Self::ALL
            .into_iter()
            .find(|a| &a.flag()[2..] == name)
            .ok_or_else(|| Error::UnknownIdentifier {
                kind: "monitor action".to_string(),
                id: s.to_string(),
            })
    }
}

/// Comma-join identifiers in catalog order, dropping duplicates
pub fn join_ids<T, F>(selected: &[T], all: &[T], id: F) -> String
where
    T: PartialEq + Copy,
    F: Fn(&T) -> &'static str,
{
    all.iter()
        .filter(|item| selected.contains(item))
        .map(id)
        .collect::<Vec<_>>()
        .join(",")
}
