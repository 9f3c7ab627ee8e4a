//! Platform abstraction layer
//!
//! The bridge only runs on Unix hosts (the control panel targets macOS,
//! and Linux is used for tests). Everything that touches the OS directly
//! goes through the traits in this module so the bridge can be exercised
//! with fakes.

mod traits;
#[cfg(unix)]
mod unix;

pub use traits::*;

/// Platform implementation factory
pub struct Platform;

impl Platform {
    /// Get the platform-specific signal operations
    pub fn signals() -> Box<dyn SignalOps> {
        #[cfg(unix)]
        {
            Box::new(unix::UnixSignals::new())
        }

        #[cfg(not(unix))]
        {
            compile_error!("Unsupported platform");
        }
    }

    /// Get the platform-specific filesystem operations
    pub fn filesystem() -> Box<dyn FilesystemOps> {
        #[cfg(unix)]
        {
            Box::new(unix::UnixFilesystem::new())
        }

        #[cfg(not(unix))]
        {
            compile_error!("Unsupported platform");
        }
    }

    /// Get the platform-specific path operations
    pub fn paths() -> Box<dyn PathOps> {
        #[cfg(unix)]
        {
            Box::new(unix::UnixPaths::new())
        }

        #[cfg(not(unix))]
        {
            compile_error!("Unsupported platform");
        }
    }
}
