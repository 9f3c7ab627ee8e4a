//! Command Execution Bridge
//!
//! Runs the barked script as a child process and reports what it did.
//!
//! - [`ScriptBridge::spawn`] / [`ScriptBridge::run`]: unprivileged, output
//!   streamed chunk by chunk
//! - [`ScriptBridge::run_privileged`]: consent first, then one elevated
//!   command line, output returned whole
//! - [`ScriptBridge::cancel`]: SIGTERM to the tracked child
//!
//! Each call produces its own [`ExecutionSession`]. The bridge tracks at
//! most one live process; a second call while one is live is rejected
//! unless overlap has been enabled.

pub mod consent;
pub mod elevation;
pub mod locator;
mod process;
pub mod quoting;
pub mod streams;

pub use consent::{ConsentDecision, ConsentPrompt, FixedConsent, TerminalConsent};
pub use elevation::{AppleScriptElevator, ElevatedOutput, ElevationError, Elevator};
pub use locator::ScriptLocator;
pub use streams::{RunningSession, SessionEvent, Utf8ChunkDecoder};

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::models::{ExecutionSession, FailureKind, Invocation, PrivilegeMode};
use crate::platform::{Platform, SignalOps};

/// The session currently owned by a bridge
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveProcess {
    session_id: String,
    /// `None` for privileged runs, which cannot be cancelled
    pid: Option<u32>,
}

type ActiveSlot = Arc<Mutex<Option<ActiveProcess>>>;

fn lock_slot(slot: &ActiveSlot) -> MutexGuard<'_, Option<ActiveProcess>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the slot when a privileged run ends, including when its future is dropped
struct SlotRelease {
    slot: ActiveSlot,
    session_id: String,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        let mut active = lock_slot(&self.slot);
        if active.as_ref().map(|a| a.session_id.as_str()) == Some(self.session_id.as_str()) {
            *active = None;
        }
    }
}

/// Launches and supervises the barked script
pub struct ScriptBridge {
    locator: ScriptLocator,
    consent: Box<dyn ConsentPrompt>,
    elevator: Box<dyn Elevator>,
    signals: Box<dyn SignalOps>,
    active: ActiveSlot,
    launches: Arc<AtomicUsize>,
    allow_overlap: bool,
}

impl ScriptBridge {
    /// Create a bridge with platform defaults for signals and elevation
    pub fn new(locator: ScriptLocator, consent: impl ConsentPrompt + 'static) -> Self {
        Self {
            locator,
            consent: Box::new(consent),
            elevator: Box::new(AppleScriptElevator::new()),
            signals: Platform::signals(),
            active: Arc::new(Mutex::new(None)),
            launches: Arc::new(AtomicUsize::new(0)),
            allow_overlap: false,
        }
    }

    /// Create a bridge from loaded configuration
    pub fn from_config(config: &BridgeConfig, consent: impl ConsentPrompt + 'static) -> Self {
        Self::new(ScriptLocator::new(config.locator.clone()), consent)
            .with_overlap(config.allow_overlap)
    }

    pub fn with_elevator(mut self, elevator: impl Elevator + 'static) -> Self {
        self.elevator = Box::new(elevator);
        self
    }

    pub fn with_signals(mut self, signals: Box<dyn SignalOps>) -> Self {
        self.signals = signals;
        self
    }

    /// Allow a new run while another tracked session is still live
    pub fn with_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    pub fn locator(&self) -> &ScriptLocator {
        &self.locator
    }

    /// Number of processes (or elevation requests) actually started
    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// True while a tracked session has not completed
    pub fn is_running(&self) -> bool {
        lock_slot(&self.active).is_some()
    }

    /// PID of the tracked unprivileged child, if any
    pub fn tracked_pid(&self) -> Option<u32> {
        lock_slot(&self.active).as_ref().and_then(|active| active.pid)
    }

    /// Start the script and return a handle that streams its output
    ///
    /// A launch failure is not an `Err`: the returned session is already
    /// completed with a diagnostic line and a non-zero exit code.
    pub fn spawn(&self, invocation: Invocation) -> Result<RunningSession> {
        // Check and claim under one lock so concurrent callers cannot both pass
        let mut active = lock_slot(&self.active);
        self.reject_overlap(&active)?;

        let interpreter = self.locator.resolve_interpreter();
        let script = self.locator.resolve_script();
        let mut session = ExecutionSession::new(invocation, PrivilegeMode::Standard);
        info!(
            "Starting session {}: {} {} {}",
            session.id,
            interpreter.display(),
            script.display(),
            session.invocation
        );

        let slot = self.active.clone();
        let session_id = session.id.clone();
        let on_exit = move || {
            let mut active = lock_slot(&slot);
            if active.as_ref().map(|a| a.session_id.as_str()) == Some(session_id.as_str()) {
                *active = None;
            }
        };

        // The slot stays locked across spawn so the exit callback cannot run
        // before the PID is recorded.
        match process::spawn_script(&interpreter, &script, session.invocation.args(), on_exit) {
            Ok(spawned) => {
                self.launches.fetch_add(1, Ordering::SeqCst);
                *active = Some(ActiveProcess {
                    session_id: session.id.clone(),
                    pid: Some(spawned.pid),
                });
                drop(active);
                debug!("Session {} running as pid {}", session.id, spawned.pid);
                Ok(RunningSession::from_channel(session, spawned.pid, spawned.events))
            }
            Err(e) => {
                drop(active);
                let code = process::launch_failure_code(&e);
                error!("Failed to launch {}: {}", interpreter.display(), e);
                session.fail_launch(&format!("{}: {}", interpreter.display(), e), code);
                Ok(RunningSession::completed(session))
            }
        }
    }

    /// Run to completion and return the finished session
    pub async fn run(&self, invocation: Invocation) -> Result<ExecutionSession> {
        Ok(self.spawn(invocation)?.wait().await)
    }

    /// Run to completion, handing each output chunk to `observer` as it arrives
    pub async fn run_with<F>(&self, invocation: Invocation, observer: F) -> Result<ExecutionSession>
    where
        F: FnMut(&str),
    {
        Ok(self.spawn(invocation)?.wait_with(observer).await)
    }

    /// Ask for consent, then run the script once with administrator privileges
    pub async fn run_privileged(
        &self,
        invocation: Invocation,
        consent_reason: &str,
    ) -> Result<ExecutionSession> {
        self.check_overlap()?;

        if !self.consent.confirm(consent_reason).await.is_accepted() {
            info!("Privileged run declined by operator: {}", invocation);
            return Ok(ExecutionSession::declined(invocation));
        }

        let interpreter = self.locator.resolve_interpreter();
        let script = self.locator.resolve_script();
        let command_line = privileged_command_line(&interpreter, &script, &invocation);
        let mut session = ExecutionSession::new(invocation, PrivilegeMode::Elevated);

        let release = {
            let mut active = lock_slot(&self.active);
            // Another run may have started while the consent prompt was open
            self.reject_overlap(&active)?;
            *active = Some(ActiveProcess {
                session_id: session.id.clone(),
                pid: None,
            });
            SlotRelease {
                slot: self.active.clone(),
                session_id: session.id.clone(),
            }
        };

        info!("Starting privileged session {}", session.id);
        self.launches.fetch_add(1, Ordering::SeqCst);
        let result = self.elevator.run_elevated(&command_line).await;
        drop(release);

        match result {
            Ok(elevated) => {
                session.append_output(&elevated.output);
                session.complete(elevated.exit_code);
            }
            Err(ElevationError::Cancelled) => {
                info!("Elevation dialog dismissed for session {}", session.id);
                session.finish_with(FailureKind::ElevationCancelled, 1);
            }
            Err(e) => {
                warn!("Elevation failed for session {}: {}", session.id, e);
                session.append_output(&format!("Error: {}", e));
                session.finish_with(FailureKind::ElevationFailed, 1);
            }
        }

        Ok(session)
    }

    /// Send SIGTERM to the tracked child
    ///
    /// Returns `Ok(false)` when there is nothing to cancel. The session still
    /// completes through its normal exit path.
    pub async fn cancel(&self) -> Result<bool> {
        let Some(pid) = self.tracked_pid() else {
            debug!("Cancel requested with no tracked process");
            return Ok(false);
        };
        if !self.signals.is_process_running(pid) {
            debug!("Tracked process {} already gone", pid);
            return Ok(false);
        }
        info!("Sending SIGTERM to script process {}", pid);
        self.signals.send_terminate(pid).await?;
        Ok(true)
    }

    /// Fail with `SessionInProgress` if a tracked session is live and overlap is off
    pub fn check_overlap(&self) -> Result<()> {
        self.reject_overlap(&lock_slot(&self.active))
    }

    fn reject_overlap(&self, active: &Option<ActiveProcess>) -> Result<()> {
        match active {
            Some(active) if !self.allow_overlap => Err(Error::SessionInProgress {
                session_id: active.session_id.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Quoted `<interpreter> <script> <args...>` for the elevation primitive
pub fn privileged_command_line(
    interpreter: &std::path::Path,
    script: &std::path::Path,
    invocation: &Invocation,
) -> String {
    let head: [PathBuf; 2] = [interpreter.to_path_buf(), script.to_path_buf()];
    quoting::command_line(
        head.iter()
            .map(|p| p.to_string_lossy().into_owned())
            .chain(invocation.args().iter().cloned()),
    )
}
