//! Integration Tests for Schedules and the Monitor Daemon
//!
//! launchd is replaced by a recording service manager; everything else
//! (records, descriptors, monitor.conf, the baseline run) is real.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use barked_bridge::bridge::FixedConsent;
use barked_bridge::config::{schedule, BarkedPaths, Frequency, ScheduleConfig};
use barked_bridge::launchd::{self, ServiceListing, MONITOR_LABEL, SCHEDULED_CLEAN_LABEL};
use barked_bridge::models::{
    AlertSeverity, CleanCategory, DaemonStatus, MonitorInterval, MonitorSettings, StartMode,
};
use barked_bridge::Error;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;
use test_utils::{bridge_for, write_stub_script, RecordingServiceManager};

#[tokio::test]
async fn test_weekly_schedule_writes_record_and_agent() {
    let home = TempDir::new().unwrap();
    let paths = BarkedPaths::under(home.path());
    let manager = RecordingServiceManager::default();
    let script = Path::new("/usr/local/bin/barked");

    let record = launchd::save_schedule(
        &manager,
        &paths,
        script,
        Frequency::Weekly,
        &[CleanCategory::DevCruft, CleanCategory::SystemCaches],
    )
    .await
    .unwrap();

    assert_eq!(record.categories, vec!["system-caches", "dev-cruft"]);
    assert_eq!(ScheduleConfig::read(&paths.schedule_file()), Some(record));
    assert_eq!(schedule::display_text(&paths.schedule_file()), "Scheduled: Weekly");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(paths.schedule_file()).unwrap()).unwrap();
    assert_eq!(raw["enabled"], true);
    assert_eq!(raw["custom_interval"], "");
    assert_eq!(raw["notify"], true);
    assert_eq!(raw["last_run"], "");
    assert_eq!(raw["version"], "1.0");

    let plist_path = paths.plist_path(SCHEDULED_CLEAN_LABEL);
    let plist = std::fs::read_to_string(&plist_path).unwrap();
    assert!(plist.contains("<key>Weekday</key>"));
    assert!(plist.contains("<string>/usr/local/bin/barked</string>"));

    assert_eq!(
        manager.calls(),
        vec![
            format!("unload {}", plist_path.display()),
            format!("load {}", plist_path.display()),
        ]
    );
}

#[tokio::test]
async fn test_daily_schedule_has_no_weekday() {
    let home = TempDir::new().unwrap();
    let paths = BarkedPaths::under(home.path());
    let manager = RecordingServiceManager::default();

    launchd::save_schedule(
        &manager,
        &paths,
        Path::new("/usr/local/bin/barked"),
        Frequency::Daily,
        &CleanCategory::ALL,
    )
    .await
    .unwrap();

    let plist = std::fs::read_to_string(paths.plist_path(SCHEDULED_CLEAN_LABEL)).unwrap();
    assert!(!plist.contains("Weekday"));
    assert!(plist.contains("<key>Hour</key>"));
    assert_eq!(schedule::display_text(&paths.schedule_file()), "Scheduled: Daily");
}

#[tokio::test]
async fn test_failed_load_surfaces_error_after_record_is_saved() {
    let home = TempDir::new().unwrap();
    let paths = BarkedPaths::under(home.path());
    let manager = RecordingServiceManager {
        load_code: 1,
        ..RecordingServiceManager::default()
    };

    let err = launchd::save_schedule(
        &manager,
        &paths,
        Path::new("/usr/local/bin/barked"),
        Frequency::Daily,
        &[CleanCategory::UserCaches],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ServiceLoadFailed { .. }));
    assert!(paths.schedule_file().exists());
}

#[tokio::test]
async fn test_monitor_install_status_and_uninstall() {
    let home = TempDir::new().unwrap();
    let paths = BarkedPaths::under(home.path());
    let script = write_stub_script("printf '%s ' \"$@\" > \"$(dirname \"$0\")/args.txt\"\necho baseline recorded\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let mut manager = RecordingServiceManager::default();

    let settings = MonitorSettings {
        start_mode: StartMode::Manual,
        interval: MonitorInterval::OneMinute,
        severity: AlertSeverity::CriticalOnly,
        create_baseline: true,
    };
    let baseline = launchd::install_monitor(&bridge, &manager, &paths, &settings)
        .await
        .unwrap()
        .expect("baseline was requested");

    assert_eq!(baseline.output(), "baseline recorded\n");
    assert_eq!(
        std::fs::read_to_string(script.dir.path().join("args.txt")).unwrap(),
        "--monitor --baseline "
    );

    assert!(paths.monitor_state_dir().is_dir());
    assert!(paths.baselines_dir().is_dir());

    let conf_path = paths.monitor_conf();
    let mode = std::fs::metadata(&conf_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    let conf = std::fs::read_to_string(&conf_path).unwrap();
    assert!(conf.contains("DAEMON_START_MODE=\"manual\""));
    assert!(conf.contains("MONITOR_INTERVAL=60"));
    assert!(conf.contains("ALERT_SEVERITY_MIN=\"critical\""));
    assert!(conf.contains("DAEMON_INSTALLED=true"));

    let plist = std::fs::read_to_string(paths.plist_path(MONITOR_LABEL)).unwrap();
    assert!(plist.contains("<string>/bin/sh</string>"));
    assert!(plist.contains(&format!("<string>{}</string>", script.path.display())));
    assert!(plist.contains("<key>RunAtLoad</key>\n  <false/>"));

    manager.listing = Some(ServiceListing {
        output: "{\n\t\"PID\" = 0;\n};\n".to_string(),
        exit_code: 0,
    });
    assert_eq!(
        launchd::monitor_status(&manager, &paths).await,
        DaemonStatus::Stopped
    );
    manager.listing = None;
    assert_eq!(
        launchd::monitor_status(&manager, &paths).await,
        DaemonStatus::Unknown
    );

    launchd::uninstall_monitor(&manager, &paths).await.unwrap();
    assert!(!paths.plist_path(MONITOR_LABEL).exists());
    let conf = std::fs::read_to_string(&conf_path).unwrap();
    assert!(conf.contains("DAEMON_INSTALLED=false"));
    assert!(!conf.contains("DAEMON_INSTALLED=true"));
    assert_eq!(
        launchd::monitor_status(&manager, &paths).await,
        DaemonStatus::NotInstalled
    );
}

#[tokio::test]
async fn test_monitor_install_without_baseline_runs_nothing() {
    let home = TempDir::new().unwrap();
    let paths = BarkedPaths::under(home.path());
    let script = write_stub_script("exit 0\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let manager = RecordingServiceManager::default();

    let baseline = launchd::install_monitor(&bridge, &manager, &paths, &MonitorSettings::default())
        .await
        .unwrap();

    assert!(baseline.is_none());
    assert_eq!(bridge.launch_count(), 0);
    let plist = std::fs::read_to_string(paths.plist_path(MONITOR_LABEL)).unwrap();
    assert!(plist.contains("<key>RunAtLoad</key>\n  <true/>"));
}

#[tokio::test]
async fn test_monitor_install_refused_while_script_runs() {
    let home = TempDir::new().unwrap();
    let paths = BarkedPaths::under(home.path());
    let script = write_stub_script("exec sleep 30\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let manager = RecordingServiceManager::default();

    let running = bridge.spawn(barked_bridge::Invocation::default()).unwrap();
    let settings = MonitorSettings {
        create_baseline: true,
        ..MonitorSettings::default()
    };

    let err = launchd::install_monitor(&bridge, &manager, &paths, &settings)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionInProgress { .. }));
    assert!(!paths.monitor_conf().exists());
    assert!(!paths.plist_path(MONITOR_LABEL).exists());
    assert!(manager.calls().is_empty());

    assert!(bridge.cancel().await.unwrap());
    running.wait().await;
}
