//! Application error types with rich context

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::Platform;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Project config not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid project config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to generate runtime config: {message}")]
    ConfigGeneration { message: String },

    // ─────────────────────────────────────────────────────────────
    // Packager Errors
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Packager port {endpoint} is already in use. Stop the running packager or pass --no-packager to reuse it."
    )]
    PortInUse { endpoint: String },

    #[error("Failed to spawn packager: {reason}")]
    PackagerSpawn { reason: String },

    #[error("Packager at {endpoint} did not become reachable within {waited:?}")]
    PackagerUnreachable { endpoint: String, waited: Duration },

    #[error("Failed to stop packager process: {message}")]
    ProcessKill { message: String },

    // ─────────────────────────────────────────────────────────────
    // Platform Toolchain Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No {platform} device found matching: {selector}")]
    DeviceNotFound { platform: Platform, selector: String },

    #[error("Build artifact not found: {path}")]
    BuildArtifactMissing { path: PathBuf },

    #[error("'{tool}' not found. Ensure it is installed and in your PATH.")]
    ToolNotFound { tool: String },

    #[error("`{command}` failed (exit code {code:?}): {stderr}")]
    ToolFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Coarse failure classes used by the orchestrator to decide the run outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration or port conflict. Never retried, nothing to clean up.
    Usage,
    /// The packager never came up.
    ReadinessTimeout,
    /// Device, build or toolchain failure inside a platform task.
    PlatformTask,
    /// Tearing down the packager failed.
    Cleanup,
    /// IO, channel or spawn failures.
    Infrastructure,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn config_generation(message: impl Into<String>) -> Self {
        Self::ConfigGeneration {
            message: message.into(),
        }
    }

    pub fn port_in_use(endpoint: impl ToString) -> Self {
        Self::PortInUse {
            endpoint: endpoint.to_string(),
        }
    }

    pub fn packager_spawn(reason: impl Into<String>) -> Self {
        Self::PackagerSpawn {
            reason: reason.into(),
        }
    }

    pub fn packager_unreachable(endpoint: impl ToString, waited: Duration) -> Self {
        Self::PackagerUnreachable {
            endpoint: endpoint.to_string(),
            waited,
        }
    }

    pub fn process_kill(message: impl Into<String>) -> Self {
        Self::ProcessKill {
            message: message.into(),
        }
    }

    pub fn device_not_found(platform: Platform, selector: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            platform,
            selector: selector.into(),
        }
    }

    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Self::BuildArtifactMissing { path: path.into() }
    }

    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(command: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Classify this error for outcome and cleanup decisions
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound { .. }
            | Error::ConfigInvalid { .. }
            | Error::ConfigGeneration { .. }
            | Error::PortInUse { .. } => ErrorKind::Usage,
            Error::PackagerUnreachable { .. } => ErrorKind::ReadinessTimeout,
            Error::DeviceNotFound { .. }
            | Error::BuildArtifactMissing { .. }
            | Error::ToolNotFound { .. }
            | Error::ToolFailed { .. } => ErrorKind::PlatformTask,
            Error::ProcessKill { .. } => ErrorKind::Cleanup,
            Error::Io(_) | Error::Json(_) | Error::ChannelClosed | Error::PackagerSpawn { .. } => {
                ErrorKind::Infrastructure
            }
        }
    }
}
