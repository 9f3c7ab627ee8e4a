//! Execution Session Model
//!
//! One run of the barked script: its accumulated output, whether it is
//! still running, and how it ended. The bridge creates a fresh session
//! for every invocation and is the only writer; callers receive owned
//! snapshots.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::models::Invocation;

/// Whether the script ran as the current user or through elevation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrivilegeMode {
    #[default]
    Standard,
    Elevated,
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// Process launched (or elevation requested) and not yet observed to exit
    #[default]
    Running,
    /// Exit observed, launch failed, or consent declined
    Completed,
}

/// Why a completed session did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The interpreter or script could not be started
    LaunchFailed,
    /// The script ran and returned a non-zero status
    NonZeroExit,
    /// The operator declined the in-app consent prompt
    ConsentDeclined,
    /// The operator dismissed the OS authentication dialog
    ElevationCancelled,
    /// The elevation mechanism reported any other error
    ElevationFailed,
}

impl FailureKind {
    /// Fixed output text for failures that carry no script output
    pub fn fixed_message(&self) -> Option<&'static str> {
        match self {
            FailureKind::ConsentDeclined => Some("Cancelled: administrator access was declined"),
            FailureKind::ElevationCancelled => {
                Some("Cancelled: the administrator authentication dialog was dismissed")
            }
            FailureKind::LaunchFailed | FailureKind::NonZeroExit | FailureKind::ElevationFailed => {
                None
            }
        }
    }

    /// True for the two operator-initiated cancellations
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            FailureKind::ConsentDeclined | FailureKind::ElevationCancelled
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::LaunchFailed => "launch failed",
            FailureKind::NonZeroExit => "non-zero exit",
            FailureKind::ConsentDeclined => "consent declined",
            FailureKind::ElevationCancelled => "elevation cancelled",
            FailureKind::ElevationFailed => "elevation failed",
        };
        f.write_str(text)
    }
}

/// One in-flight or completed run of the script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSession {
    /// Unique identifier for the session
    pub id: String,

    /// Arguments passed after the script path
    pub invocation: Invocation,

    /// How the script was launched
    pub mode: PrivilegeMode,

    /// When the session started (in local time)
    pub started_at: DateTime<Local>,

    output: String,
    status: SessionStatus,
    exit_code: Option<i32>,
    failure: Option<FailureKind>,
    finished_at: Option<DateTime<Local>>,
}

impl ExecutionSession {
    /// Create a running session
    pub fn new(invocation: Invocation, mode: PrivilegeMode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invocation,
            mode,
            started_at: Local::now(),
            output: String::new(),
            status: SessionStatus::Running,
            exit_code: None,
            failure: None,
            finished_at: None,
        }
    }

    /// A privileged session that never started because consent was declined
    pub fn declined(invocation: Invocation) -> Self {
        let mut session = Self::new(invocation, PrivilegeMode::Elevated);
        session.finish_with(FailureKind::ConsentDeclined, 1);
        session
    }

    /// Accumulated output, in arrival order
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True from launch until the exit is observed
    pub fn is_running(&self) -> bool {
        matches!(self.status, SessionStatus::Running)
    }

    /// Exit code; `None` while running
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    /// Completed with exit code zero
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn finished_at(&self) -> Option<DateTime<Local>> {
        self.finished_at
    }

    /// Wall time between start and completion
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
    }

    /// Append a decoded chunk. Ignored once the session has completed.
    pub(crate) fn append_output(&mut self, chunk: &str) {
        if self.is_running() {
            self.output.push_str(chunk);
        } else {
            warn!("Dropping {} bytes of output for completed session {}", chunk.len(), self.id);
        }
    }

    /// Record the exit status. Returns false if the session already completed.
    pub(crate) fn complete(&mut self, exit_code: i32) -> bool {
        if !self.is_running() {
            debug!("Session {} already completed, ignoring exit code {}", self.id, exit_code);
            return false;
        }
        self.status = SessionStatus::Completed;
        self.exit_code = Some(exit_code);
        if exit_code != 0 && self.failure.is_none() {
            self.failure = Some(FailureKind::NonZeroExit);
        }
        self.finished_at = Some(Local::now());
        true
    }

    /// Complete with a specific failure kind, appending its fixed message if any
    pub(crate) fn finish_with(&mut self, failure: FailureKind, exit_code: i32) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(message) = failure.fixed_message() {
            self.output.push_str(message);
        }
        self.failure = Some(failure);
        self.complete(exit_code)
    }

    /// Complete after the process could not be started
    pub(crate) fn fail_launch(&mut self, reason: &str, exit_code: i32) -> bool {
        if !self.is_running() {
            return false;
        }
        self.output.push_str(&format!("\nError: {}", reason));
        self.failure = Some(FailureKind::LaunchFailed);
        self.complete(exit_code)
    }
}
