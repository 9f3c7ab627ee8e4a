//! Script invocations
//!
//! An [`Invocation`] is the argument list appended after the script path.
//! Callers either pass raw strings or use the named constructors, which
//! produce the flag combinations the barked script recognises.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::catalog::{join_ids, CleanCategory, HardenModule, MonitorAction, Profile};

/// Token the script prints after a successful self-update
pub const RELAUNCH_SENTINEL: &str = "__BARKED_RELAUNCH__";

/// Text the script prints when no update is available
pub const UP_TO_DATE_MARKER: &str = "Already up to date";

/// Ordered, immutable argument list for one script run
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Invocation {
    args: Vec<String>,
}

impl Invocation {
    /// Build from any sequence of strings; contents are passed through untouched
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// `--clean --dry-run --clean-cats <list>`
    pub fn clean_preview(categories: &[CleanCategory]) -> Self {
        Self::new([
            "--clean".to_string(),
            "--dry-run".to_string(),
            "--clean-cats".to_string(),
            join_ids(categories, &CleanCategory::ALL, CleanCategory::id),
        ])
    }

    /// `--clean --force --clean-cats <list>`
    pub fn clean_force(categories: &[CleanCategory]) -> Self {
        Self::new([
            "--clean".to_string(),
            "--force".to_string(),
            "--clean-cats".to_string(),
            join_ids(categories, &CleanCategory::ALL, CleanCategory::id),
        ])
    }

    /// Interactive schedule setup handled by the script itself
    pub fn clean_schedule() -> Self {
        Self::new(["--clean-schedule"])
    }

    pub fn clean_unschedule() -> Self {
        Self::new(["--clean-unschedule"])
    }

    /// What the scheduled launch agent runs
    pub fn clean_scheduled() -> Self {
        Self::new(["--clean-scheduled"])
    }

    /// `--profile <name> --auto --yes`
    pub fn apply_profile(profile: Profile) -> Self {
        Self::new(["--profile", profile.id(), "--auto", "--yes"])
    }

    /// `--modify --modules <list> --yes`
    pub fn modify(modules: &[HardenModule]) -> Self {
        Self::new([
            "--modify".to_string(),
            "--modules".to_string(),
            join_ids(modules, &HardenModule::ALL, HardenModule::id),
            "--yes".to_string(),
        ])
    }

    pub fn uninstall() -> Self {
        Self::new(["--uninstall", "--yes"])
    }

    /// `--monitor <action>`
    pub fn monitor(action: MonitorAction) -> Self {
        Self::new(["--monitor", action.flag()])
    }

    pub fn update_app() -> Self {
        Self::new(["--update-app"])
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

impl From<Vec<String>> for Invocation {
    fn from(args: Vec<String>) -> Self {
        Self { args }
    }
}

/// How a `--update-app` run ended, judged by its output only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Update installed; the application should relaunch
    Relaunch,
    /// Nothing to install
    UpToDate,
    /// Neither marker present
    Failed,
}

impl UpdateOutcome {
    /// Classify collected output. The exit code is intentionally not an input.
    pub fn classify(output: &str) -> Self {
        if output.contains(RELAUNCH_SENTINEL) {
            UpdateOutcome::Relaunch
        } else if output.contains(UP_TO_DATE_MARKER) {
            UpdateOutcome::UpToDate
        } else {
            UpdateOutcome::Failed
        }
    }
}
