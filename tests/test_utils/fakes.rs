//! Fake elevation and service manager

use barked_bridge::bridge::{ElevatedOutput, ElevationError, Elevator};
use barked_bridge::launchd::{ServiceListing, ServiceManager};
use barked_bridge::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// What the fake elevator answers with
#[derive(Debug, Clone)]
pub enum ElevatorReply {
    /// Run the command line with `/bin/sh -c` and report its real result
    Execute,
    /// Operator dismissed the OS dialog
    Cancel,
    /// Elevation machinery failed
    Fail(String),
    /// Never answers, like a password dialog left open
    Hang,
}

/// Elevator that records every command line it receives
#[derive(Clone)]
pub struct RecordingElevator {
    reply: ElevatorReply,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingElevator {
    pub fn new(reply: ElevatorReply) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Elevator for RecordingElevator {
    async fn run_elevated(
        &self,
        command_line: &str,
    ) -> std::result::Result<ElevatedOutput, ElevationError> {
        self.calls.lock().unwrap().push(command_line.to_string());
        match &self.reply {
            ElevatorReply::Execute => {
                let output = tokio::process::Command::new("/bin/sh")
                    .arg("-c")
                    .arg(format!("{} 2>&1", command_line))
                    .output()
                    .await?;
                Ok(ElevatedOutput {
                    output: String::from_utf8_lossy(&output.stdout).into_owned(),
                    exit_code: output.status.code().unwrap_or(1),
                })
            }
            ElevatorReply::Cancel => Err(ElevationError::Cancelled),
            ElevatorReply::Fail(message) => Err(ElevationError::Failed {
                code: Some(-60007),
                message: message.clone(),
            }),
            ElevatorReply::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Err(ElevationError::Cancelled)
            }
        }
    }
}

/// Service manager that records calls instead of touching launchd
#[derive(Clone, Default)]
pub struct RecordingServiceManager {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub load_code: i32,
    pub listing: Option<ServiceListing>,
}

impl RecordingServiceManager {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ServiceManager for RecordingServiceManager {
    async fn unload(&self, plist: &Path) -> Result<i32> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("unload {}", plist.display()));
        Ok(0)
    }

    async fn load(&self, plist: &Path) -> Result<i32> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("load {}", plist.display()));
        Ok(self.load_code)
    }

    async fn list(&self, label: &str) -> Result<ServiceListing> {
        self.calls.lock().unwrap().push(format!("list {}", label));
        self.listing
            .clone()
            .ok_or_else(|| barked_bridge::Error::Other("launchctl unavailable".to_string()))
    }
}
