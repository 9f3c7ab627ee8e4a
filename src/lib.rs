//! Barked Bridge - command execution bridge for the barked hardening script
//!
//! The barked control panel never changes the system itself. It composes
//! arguments, runs the external `barked` shell script (optionally as
//! administrator), streams what the script prints and reports how it
//! ended. This crate is that bridge plus the small pieces around it.
//!
//! ## Module Organization
//!
//! - [`bridge`] - Script launching, streaming, consent, elevation, cancellation
//! - [`models`] - Sessions, invocations, and the catalog of script operations
//! - [`config`] - Bridge settings, per-user paths, the scheduled-clean record
//! - [`launchd`] - LaunchAgent descriptors, `launchctl`, monitor daemon setup
//! - [`platform`] - Signals, executable checks, per-user directories
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use barked_bridge::{FixedConsent, Invocation, ScriptBridge, ScriptLocator};
//!
//! # async fn demo() -> barked_bridge::Result<()> {
//! let bridge = ScriptBridge::new(ScriptLocator::default(), FixedConsent::decline());
//! let session = bridge
//!     .run_with(Invocation::new(["--version"]), |chunk| print!("{}", chunk))
//!     .await?;
//! println!("exit code: {:?}", session.exit_code());
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! Each unprivileged run gets one reader thread that drains the merged
//! stdout/stderr pipe and reaps the child. Chunks travel to the caller over
//! a `tokio::sync::mpsc` channel and are appended on the caller's task, so
//! session output always reflects arrival order.
//!
//! ## Platform Support
//!
//! - macOS: full support (elevation via `osascript`, launchd agents)
//! - Linux: unprivileged runs, schedule records, descriptor rendering

#[macro_use]
extern crate tracing;

pub mod bridge;
pub mod config;
pub mod error;
pub mod launchd;
pub mod models;
pub mod platform;

// Re-exports for core functionality
pub use bridge::{
    ConsentDecision, ConsentPrompt, FixedConsent, RunningSession, ScriptBridge, ScriptLocator,
    SessionEvent, TerminalConsent,
};
pub use config::{BarkedPaths, BridgeConfig, ConfigLoader, LocatorConfig};
pub use error::{Error, Result};
pub use models::{ExecutionSession, FailureKind, Invocation, PrivilegeMode, UpdateOutcome};

// Version information
/// The current version of the bridge from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration from `config_path`, or from the default search paths
///
/// An explicit path must exist and parse. Without one, a broken file in
/// the search paths is skipped with a warning and defaults are used.
pub fn load_config(config_path: Option<&std::path::Path>) -> Result<BridgeConfig> {
    match config_path {
        Some(path) => {
            let config = ConfigLoader::load_from_path(path)?;
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        None => ConfigLoader::load(),
    }
}
