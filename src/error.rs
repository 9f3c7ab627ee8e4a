//! Error types and Result aliases for the barked bridge

use std::fmt;
use std::path::PathBuf;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bridge
///
/// Launch, exit and elevation failures of the script itself are not
/// reported here: they are folded into the session output and its
/// [`FailureKind`](crate::models::FailureKind). This type covers the
/// failures of the bridge's own plumbing and of persistence.
#[derive(Debug)]
pub enum Error {
    // === Session errors ===
    /// A tracked session is still running and overlap is disabled
    SessionInProgress {
        session_id: String,
    },

    // === Signal errors ===
    /// Failed to send signal to process
    SignalSendFailed {
        signal: String,
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to save configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    /// Per-user directory could not be determined
    DirectoryUnavailable {
        kind: String,
    },

    // === Service manager errors ===
    /// Writing a service descriptor failed
    DescriptorWriteFailed {
        path: PathBuf,
        reason: String,
    },

    /// The service manager refused to load a descriptor
    ServiceLoadFailed {
        label: String,
        reason: String,
    },

    /// The service manager could not be invoked
    ServiceManagerUnavailable {
        reason: String,
    },

    // === Catalog errors ===
    /// Identifier does not name a known catalog entry
    UnknownIdentifier {
        kind: String,
        id: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    /// Generic errors
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Session errors
            Error::SessionInProgress { session_id } => {
                write!(f, "Session '{}' is still running", session_id)
            }

            // Signal errors
            Error::SignalSendFailed { signal, reason } => {
                write!(f, "Failed to send signal '{}': {}", signal, reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }
            Error::DirectoryUnavailable { kind } => {
                write!(f, "Could not determine {} directory", kind)
            }

            // Service manager errors
            Error::DescriptorWriteFailed { path, reason } => {
                write!(f, "Failed to write service descriptor '{}': {}", path.display(), reason)
            }
            Error::ServiceLoadFailed { label, reason } => {
                write!(f, "launchctl load failed for '{}': {}", label, reason)
            }
            Error::ServiceManagerUnavailable { reason } => {
                write!(f, "Service manager unavailable: {}", reason)
            }

            // Catalog errors
            Error::UnknownIdentifier { kind, id } => {
                write!(f, "Unknown {} '{}'", kind, id)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),

            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
