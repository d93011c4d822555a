//! Error types used throughout the client
//!
//! Every failure that crosses the client boundary is an [`ApiError`]. Each
//! variant maps to a stable code (see [`ApiError::code`]) so callers can match
//! on codes without parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::ERROR_CODE_PREFIX;

/// Broad error categories, used for log labels and caller-side branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCategory {
    /// Non-success HTTP status after at most one refresh retry
    Transport,
    /// Successful response whose body could not be decoded
    Decode,
    /// No HTTP response at all (connect failure, timeout, broken body)
    Network,
    /// Server-side job was canceled or faulted
    Job,
    /// Malformed payload or job result
    Validation,
    /// Local file system or archive failure
    Local,
    /// Invalid client configuration
    Config,
    /// Stopped by the caller (cancellation token or deadline)
    Cancelled,
}

/// Main error type of the Nexus client
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ApiError {
    #[error("{message}")]
    Transport { status: u16, message: String },

    #[error("Response data could not be deserialized: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("The job has been cancelled.")]
    JobCanceled,

    #[error("The job has failed. Reason: {reason}")]
    JobFaulted { reason: String },

    #[error("The job result is invalid.")]
    InvalidJobResult,

    #[error("The data length is invalid: {length} bytes is not a multiple of 8.")]
    InvalidDataLength { length: usize },

    #[error("The stream ended early: expected {expected} bytes, received {received}.")]
    StreamEndedEarly { expected: u64, received: u64 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl ApiError {
    /// Build a transport error from a status code and the (possibly empty)
    /// response body.
    pub fn transport(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("The HTTP request failed with status code {status}.")
        } else {
            format!(
                "The HTTP request failed with status code {status}. The response message is: {body}"
            )
        };

        Self::Transport { status, message }
    }

    /// Stable error code, e.g. `N00.404` or `N01`.
    pub fn code(&self) -> String {
        match self {
            Self::Transport { status, .. } => format!("{ERROR_CODE_PREFIX}00.{status}"),
            other => format!("{ERROR_CODE_PREFIX}{:02}", other.code_number()),
        }
    }

    fn code_number(&self) -> u8 {
        match self.category() {
            ApiErrorCategory::Transport => 0,
            ApiErrorCategory::Decode => 1,
            ApiErrorCategory::Network => 2,
            ApiErrorCategory::Job => 3,
            ApiErrorCategory::Validation => 4,
            ApiErrorCategory::Local => 5,
            ApiErrorCategory::Config => 6,
            ApiErrorCategory::Cancelled => 7,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Transport { .. } => ApiErrorCategory::Transport,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::JobCanceled | Self::JobFaulted { .. } => ApiErrorCategory::Job,
            Self::InvalidJobResult
            | Self::InvalidDataLength { .. }
            | Self::StreamEndedEarly { .. } => ApiErrorCategory::Validation,
            Self::Io(_) | Self::Archive(_) => ApiErrorCategory::Local,
            Self::Config(_) => ApiErrorCategory::Config,
            Self::Cancelled | Self::Timeout(_) => ApiErrorCategory::Cancelled,
        }
    }

    /// HTTP status carried by a transport error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for a 401 transport error.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
