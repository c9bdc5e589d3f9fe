//! Error types for the Drone provider.
//!
//! Identity parsing, remote API failures and attribute validation each get a
//! variant. Everything propagates to the caller unchanged.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error type for all provider operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed composite identity (wrong segment count).
    #[error("invalid identity {input:?}: expected {expected}")]
    Parse {
        input: String,
        expected: &'static str,
    },

    /// The Drone API call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Attribute bag rejected before any API call was made.
    #[error("invalid attributes for {resource_type}: {message}")]
    Validation {
        resource_type: String,
        message: String,
    },
}

/// Failures surfaced by the HTTP client.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("API request failed: {status} {message}")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(input: &str, expected: &'static str) -> Self {
        Self::Parse {
            input: input.to_string(),
            expected,
        }
    }

    pub(crate) fn validation(resource_type: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            resource_type: resource_type.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of a failed API call, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote(RemoteError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(RemoteError::Transport(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Remote(RemoteError::Decode(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
