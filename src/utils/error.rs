//! Error types surfaced to the user
//!
//! Every variant renders as the plain-text message shown in the terminal,
//! so `to_string()` is the user-visible text.

use thiserror::Error;

/// Fallback message when a rejected request carries no usable `detail`
pub const GENERIC_FAILURE_MESSAGE: &str = "STLC process failed";

/// Failures while importing requirements from a local file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please upload a valid text file (.txt)")]
    UnsupportedFileType {
        name: String,
        media_type: Option<String>,
    },

    #[error("Failed to read file. Please try again.")]
    FileRead { name: String, reason: String },

    #[error("A file import is already in progress")]
    ImportInProgress,
}

/// Failures of the single `/chat` request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Transport-level failure (connection refused, reset, DNS...)
    #[error("{0}")]
    Network(String),

    /// A 2xx answer whose body is not JSON
    #[error("{0}")]
    MalformedBody(String),

    /// The background request task went away without reporting
    #[error("STLC request ended unexpectedly")]
    Interrupted,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
