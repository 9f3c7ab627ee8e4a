//! LaunchAgent descriptors
//!
//! A [`LaunchAgent`] renders to the XML property list launchd reads from
//! `~/Library/LaunchAgents/<label>.plist`.

use std::path::{Path, PathBuf};

use crate::config::{BarkedPaths, Frequency};
use crate::models::StartMode;

/// Label of the scheduled clean job
pub const SCHEDULED_CLEAN_LABEL: &str = "com.barked.scheduled-clean";

/// Label of the monitor daemon
pub const MONITOR_LABEL: &str = "com.barked.monitor";

/// Seconds launchd waits before restarting the monitor daemon
pub const MONITOR_THROTTLE_SECS: u32 = 60;

const PLIST_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
"#;

/// `StartCalendarInterval` trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarInterval {
    /// 0 is Sunday; `None` fires every day
    pub weekday: Option<u8>,
    pub hour: u8,
    pub minute: u8,
}

impl CalendarInterval {
    /// 02:00, daily or on Sundays
    pub fn nightly(frequency: Frequency) -> Self {
        Self {
            weekday: match frequency {
                Frequency::Daily => None,
                Frequency::Weekly => Some(0),
            },
            hour: 2,
            minute: 0,
        }
    }
}

/// A per-user launchd job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAgent {
    pub label: String,
    pub program_arguments: Vec<String>,
    pub calendar: Option<CalendarInterval>,
    pub run_at_load: bool,
    pub keep_alive: bool,
    pub throttle_interval: Option<u32>,
    pub stdout_path: Option<PathBuf>,
    pub stderr_path: Option<PathBuf>,
}

impl LaunchAgent {
    /// Job that runs `<script> --clean-scheduled` at 02:00
    pub fn scheduled_clean(script: &Path, frequency: Frequency, paths: &BarkedPaths) -> Self {
        Self {
            label: SCHEDULED_CLEAN_LABEL.to_string(),
            program_arguments: vec![
                script.to_string_lossy().into_owned(),
                "--clean-scheduled".to_string(),
            ],
            calendar: Some(CalendarInterval::nightly(frequency)),
            run_at_load: false,
            keep_alive: false,
            throttle_interval: None,
            stdout_path: Some(paths.logs_dir.join("barked-clean.log")),
            stderr_path: Some(paths.logs_dir.join("barked-clean-error.log")),
        }
    }

    /// Long-running `<bash> <script> --monitor --daemon`
    pub fn monitor(
        interpreter: &Path,
        script: &Path,
        start_mode: StartMode,
        paths: &BarkedPaths,
    ) -> Self {
        Self {
            label: MONITOR_LABEL.to_string(),
            program_arguments: vec![
                interpreter.to_string_lossy().into_owned(),
                script.to_string_lossy().into_owned(),
                "--monitor".to_string(),
                "--daemon".to_string(),
            ],
            calendar: None,
            run_at_load: start_mode.runs_at_load(),
            keep_alive: true,
            throttle_interval: Some(MONITOR_THROTTLE_SECS),
            stdout_path: Some(paths.config_dir.join("monitor-stdout.log")),
            stderr_path: Some(paths.config_dir.join("monitor-stderr.log")),
        }
    }

    /// Render as an XML property list
    pub fn to_plist(&self) -> String {
        let mut out = String::from(PLIST_HEADER);
        out.push_str("<dict>\n");

        push_key(&mut out, 1, "Label");
        push_string(&mut out, 1, &self.label);

        push_key(&mut out, 1, "ProgramArguments");
        push_line(&mut out, 1, "<array>");
        for arg in &self.program_arguments {
            push_string(&mut out, 2, arg);
        }
        push_line(&mut out, 1, "</array>");

        if let Some(calendar) = &self.calendar {
            push_key(&mut out, 1, "StartCalendarInterval");
            push_line(&mut out, 1, "<dict>");
            if let Some(weekday) = calendar.weekday {
                push_key(&mut out, 2, "Weekday");
                push_integer(&mut out, 2, weekday.into());
            }
            push_key(&mut out, 2, "Hour");
            push_integer(&mut out, 2, calendar.hour.into());
            push_key(&mut out, 2, "Minute");
            push_integer(&mut out, 2, calendar.minute.into());
            push_line(&mut out, 1, "</dict>");
        }

        push_key(&mut out, 1, "RunAtLoad");
        push_bool(&mut out, 1, self.run_at_load);

        if self.keep_alive {
            push_key(&mut out, 1, "KeepAlive");
            push_bool(&mut out, 1, true);
        }

        if let Some(throttle) = self.throttle_interval {
            push_key(&mut out, 1, "ThrottleInterval");
            push_integer(&mut out, 1, throttle);
        }

        if let Some(path) = &self.stdout_path {
            push_key(&mut out, 1, "StandardOutPath");
            push_string(&mut out, 1, &path.to_string_lossy());
        }
        if let Some(path) = &self.stderr_path {
            push_key(&mut out, 1, "StandardErrorPath");
            push_string(&mut out, 1, &path.to_string_lossy());
        }

        out.push_str("</dict>\n</plist>\n");
        out
    }
}

/// Escape text for an XML element body
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

fn push_key(out: &mut String, depth: usize, key: &str) {
    push_line(out, depth, &format!("<key>{}</key>", key));
}

fn push_string(out: &mut String, depth: usize, value: &str) {
    push_line(out, depth, &format!("<string>{}</string>", xml_escape(value)));
}

fn push_integer(out: &mut String, depth: usize, value: u32) {
    push_line(out, depth, &format!("<integer>{}</integer>", value));
}

fn push_bool(out: &mut String, depth: usize, value: bool) {
    push_line(out, depth, if value { "<true/>" } else { "<false/>" });
}
