//! Error types for conan-cleanup
//!
//! All modules use `CleanupResult<T>` as their return type. Per-file and
//! per-package failures are carried as data in reports; only errors that
//! invalidate the whole run are propagated with `?`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for conan-cleanup operations
pub type CleanupResult<T> = Result<T, CleanupError>;

/// All errors that can occur in conan-cleanup
#[derive(Error, Debug)]
pub enum CleanupError {
    // Descriptor errors
    #[error("Malformed descriptor {path}:{line}: {reason}: '{content}'")]
    MalformedDescriptor {
        path: PathBuf,
        line: usize,
        content: String,
        reason: String,
    },

    // Package manager errors
    #[error("Cache inventory unavailable: {0}")]
    InventoryUnavailable(String),

    #[error("Removal of {reference} failed: {detail}")]
    RemovalFailed { reference: String, detail: String },

    #[error("Command timed out after {}s: {command}", .timeout.as_secs())]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Interaction errors
    #[error("Cleanup aborted by user")]
    ConfirmationAborted,

    #[error("Prompt failed: {0}")]
    Prompt(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CleanupError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a malformed descriptor error for one line
    pub fn malformed(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedDescriptor {
            path: path.into(),
            line,
            content: content.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InventoryUnavailable(_) => {
                Some("Check that `conan` is on PATH, or set conan.binary in the config")
            }
            Self::CommandTimeout { .. } => Some("Raise conan.timeout_secs in the config"),
            Self::ConfigInvalid { .. } => Some("Run: conan-cleanup config init --force"),
            Self::PathNotFound(_) => Some("Pass the directory that contains your projects"),
            _ => None,
        }
    }
}
