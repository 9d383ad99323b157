//! Error types for langroute.

use crate::defaults::exit_code;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    // Usage errors
    #[error("{message}")]
    Usage { message: String },

    // Input errors
    #[error("Audio file not found: {path}")]
    FileNotFound { path: String },

    #[error("Audio file is not readable: {path} ({reason})")]
    FileUnreadable { path: String, reason: String },

    #[error("Unsupported file type '{extension}' for {path} (expected one of: {allowed})")]
    UnsupportedFileType {
        path: String,
        extension: String,
        allowed: String,
    },

    // Engine errors
    #[error("{env} is not set. Set it and retry.")]
    ApiKeyMissing { env: String },

    #[error("Transcription API rejected the credentials: {message}")]
    Authentication { message: String },

    #[error("Transcription API unreachable: {message}")]
    Transport { message: String },

    #[error("Transcription API error (status {status}): {message}")]
    EngineRejected { status: u16, message: String },

    #[error("Malformed transcription response: {message}")]
    MalformedResponse { message: String },

    // Probe tool errors
    #[error("Probe tool not found: {tool}")]
    ProbeToolMissing { tool: String },

    #[error("Probe tool failed: {message}")]
    ProbeToolFailed { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad class of a [`RouteError`], one per exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Input,
    Engine,
    ProbeTool,
}

impl RouteError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage { .. } | Self::Io(_) | Self::Json(_) => ErrorCategory::Usage,
            Self::FileNotFound { .. }
            | Self::FileUnreadable { .. }
            | Self::UnsupportedFileType { .. } => ErrorCategory::Input,
            Self::ApiKeyMissing { .. }
            | Self::Authentication { .. }
            | Self::Transport { .. }
            | Self::EngineRejected { .. }
            | Self::MalformedResponse { .. } => ErrorCategory::Engine,
            Self::ProbeToolMissing { .. } | Self::ProbeToolFailed { .. } => {
                ErrorCategory::ProbeTool
            }
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Usage => exit_code::USAGE_ERROR,
            ErrorCategory::Input => exit_code::FILE_ERROR,
            ErrorCategory::Engine => exit_code::API_ERROR,
            ErrorCategory::ProbeTool => exit_code::PROBE_TOOL_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouteError>;
