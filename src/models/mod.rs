//! Core data models for the bridge
//!
//! Sessions produced by the bridge, the invocations that start them, and
//! the closed catalogs shared with the barked script.

pub mod catalog;
pub mod invocation;
pub mod monitor;
pub mod session;

// Re-exports for convenience
pub use catalog::{CleanCategory, HardenModule, ModuleGroup, MonitorAction, Profile};
pub use invocation::{Invocation, UpdateOutcome, RELAUNCH_SENTINEL, UP_TO_DATE_MARKER};
pub use monitor::{AlertSeverity, DaemonStatus, MonitorInterval, MonitorSettings, StartMode};
pub use session::{ExecutionSession, FailureKind, PrivilegeMode, SessionStatus};
