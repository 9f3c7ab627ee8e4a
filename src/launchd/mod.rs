//! launchd integration
//!
//! Renders LaunchAgent property lists, drives `launchctl`, and installs the
//! two jobs the panel manages:
//!
//! - `com.barked.scheduled-clean`: runs `--clean-scheduled` at 02:00
//! - `com.barked.monitor`: keeps `--monitor --daemon` alive

pub mod manager;
pub mod monitor;
pub mod plist;
pub mod scheduled;

pub use manager::{
    daemon_status, install_agent, status_from_listing, uninstall_agent, Launchctl, ServiceListing,
    ServiceManager,
};
pub use monitor::{install_monitor, monitor_status, render_monitor_conf, uninstall_monitor};
pub use plist::{xml_escape, CalendarInterval, LaunchAgent, MONITOR_LABEL, SCHEDULED_CLEAN_LABEL};
pub use scheduled::save_schedule;
