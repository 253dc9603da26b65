//! Unified error model for the admin access layer.
//! Every fallible operation in the crate returns `AppResult<T>`; pages and the CLI
//! decide how to surface the failure (toast, log line, exit code).

use thiserror::Error;

/// Message used when the backend rejects a request without a `message` field.
pub const UNKNOWN_ERROR: &str = "Some unknown error occurred";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// Missing or invalid configuration (empty signing secret, bad origin).
    #[error("config: {0}")]
    Config(String),
    #[error("signing: {0}")]
    Signing(String),
    /// Credential authority rejected the login or returned an unusable payload.
    #[error("credential: {0}")]
    Credential(String),
    /// No response was received at all.
    #[error("transport: {0}")]
    Transport(String),
    /// Non-2xx response carrying a parsed JSON body.
    #[error("{message}")]
    Remote { status: u16, status_text: String, message: String },
    /// The body could not be parsed (or did not have the expected shape).
    #[error("{status_text}")]
    Decode { status: u16, status_text: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code_str(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Signing(_) => "signing",
            AppError::Credential(_) => "credential",
            AppError::Transport(_) => "transport",
            AppError::Remote { .. } => "remote",
            AppError::Decode { .. } => "decode",
            AppError::Internal(_) => "internal",
        }
    }

    /// The text a page would show in its error notice.
    pub fn message(&self) -> &str {
        match self {
            AppError::Config(m)
            | AppError::Signing(m)
            | AppError::Credential(m)
            | AppError::Transport(m)
            | AppError::Internal(m) => m.as_str(),
            AppError::Remote { message, .. } => message.as_str(),
            AppError::Decode { status_text, .. } => status_text.as_str(),
        }
    }

    /// Raw HTTP status line text, when a response was received.
    pub fn status_text(&self) -> Option<&str> {
        match self {
            AppError::Remote { status_text, .. } | AppError::Decode { status_text, .. } => Some(status_text.as_str()),
            _ => None,
        }
    }

    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Remote { status, .. } | AppError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures the backend explained itself ("expected failure with message").
    pub fn is_expected(&self) -> bool {
        matches!(self, AppError::Remote { .. })
    }

    pub fn remote<S: Into<String>>(status: u16, status_text: S, message: Option<String>) -> Self {
        AppError::Remote {
            status,
            status_text: status_text.into(),
            message: message.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }
    }

    pub fn decode<S: Into<String>>(status: u16, status_text: S) -> Self {
        AppError::Decode { status, status_text: status_text.into() }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Signing(err.to_string())
    }
}
