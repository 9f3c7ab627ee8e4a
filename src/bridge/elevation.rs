//! Privilege elevation
//!
//! On macOS the standard "ask once, run this command line as administrator"
//! primitive is AppleScript's `do shell script ... with administrator
//! privileges`, driven here through `osascript`. It captures output as a
//! whole, so privileged runs are not streamed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;

use super::quoting::applescript_string;

/// AppleScript error number for "User canceled."
pub const USER_CANCELED_ERROR: i32 = -128;

/// Default location of the AppleScript runner
pub const OSASCRIPT_PATH: &str = "/usr/bin/osascript";

static EXECUTION_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)execution error:\s*(.*?)\s*\((-?\d+)\)\s*$").expect("static regex is valid")
});

/// Output of a command that ran with elevated privileges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatedOutput {
    /// Combined stdout/stderr of the command
    pub output: String,
    /// Exit status of the command
    pub exit_code: i32,
}

/// Failures of the elevation mechanism itself
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("the administrator authentication dialog was dismissed")]
    Cancelled,

    #[error("elevation failed: {message}")]
    Failed { code: Option<i32>, message: String },

    #[error("elevation helper could not be started: {0}")]
    Unavailable(#[from] std::io::Error),
}

/// Runs one shell command line as administrator
#[async_trait::async_trait]
pub trait Elevator: Send + Sync {
    async fn run_elevated(&self, command_line: &str) -> Result<ElevatedOutput, ElevationError>;
}

/// `osascript`-backed elevator
#[derive(Debug, Clone)]
pub struct AppleScriptElevator {
    osascript: PathBuf,
}

impl AppleScriptElevator {
    pub fn new() -> Self {
        Self {
            osascript: PathBuf::from(OSASCRIPT_PATH),
        }
    }

    /// Use a different `osascript` binary
    pub fn with_osascript(path: impl Into<PathBuf>) -> Self {
        Self {
            osascript: path.into(),
        }
    }
}

impl Default for AppleScriptElevator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Elevator for AppleScriptElevator {
    async fn run_elevated(&self, command_line: &str) -> Result<ElevatedOutput, ElevationError> {
        let source = applescript_source(command_line);
        debug!("Requesting elevation via {}", self.osascript.display());

        let output = tokio::process::Command::new(&self.osascript)
            .arg("-e")
            .arg(&source)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            // osascript terminates the returned value with one newline of its own
            if text.ends_with('\n') {
                text.pop();
            }
            return Ok(ElevatedOutput {
                output: text,
                exit_code: 0,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        parse_osascript_error(&stderr)
    }
}

/// AppleScript that runs `command_line` as administrator
///
/// stderr is folded into stdout and line endings are left alone so the
/// result reads like an unprivileged run.
pub fn applescript_source(command_line: &str) -> String {
    format!(
        "do shell script {} with administrator privileges without altering line endings",
        applescript_string(&format!("{} 2>&1", command_line))
    )
}

/// Interpret an `osascript` failure
///
/// A positive error number is the shell command's own exit status and is
/// reported as a completed run. `-128` is the operator dismissing the
/// dialog; any other number is an elevation failure.
pub fn parse_osascript_error(stderr: &str) -> Result<ElevatedOutput, ElevationError> {
    let Some(captures) = EXECUTION_ERROR.captures(stderr) else {
        return Err(ElevationError::Failed {
            code: None,
            message: stderr.trim().to_string(),
        });
    };

    let message = captures.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
    let code = captures
        .get(2)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(1);

    match code {
        USER_CANCELED_ERROR => Err(ElevationError::Cancelled),
        code if code > 0 => Ok(ElevatedOutput {
            output: message,
            exit_code: code,
        }),
        code => Err(ElevationError::Failed {
            code: Some(code),
            message,
        }),
    }
}
