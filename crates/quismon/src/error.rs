//! Error types for Quismon API operations.
//!
//! Errors are categorized so callers can decide how to surface them:
//! a missing remote object is handled very differently from a network
//! failure or a malformed response.

use std::fmt;

/// Result type alias for Quismon API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never produced an HTTP response.
    Network,
    /// The server answered with an error status or an error envelope.
    Remote,
    /// A request or response body could not be (de)serialized.
    Format,
    /// The requested object does not exist remotely.
    NotFound,
    /// Local configuration is invalid; nothing was sent.
    Configuration,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Remote => "Quismon API rejected the request",
            Self::Format => "Unexpected payload",
            Self::NotFound => "Object not found",
            Self::Configuration => "Invalid configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and the configured base URL",
            Self::Remote => "Check the API key and the values sent in the request",
            Self::Format => "The API may have changed; check for a newer release of this tool",
            Self::NotFound => "The object may have been deleted outside of this tool",
            Self::Configuration => "Fix the reported attribute and try again",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the Quismon API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client constructed without a base URL.
    #[error("base URL is required")]
    MissingBaseUrl,

    /// Network, DNS or timeout failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// HTTP status >= 400, or an error envelope.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Envelope `error` field, or the raw body.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// Remote object does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of object ("check", "notification channel", ...).
        kind: &'static str,
        /// Identifier or name that was looked up.
        id: String,
    },

    /// Check or channel configuration failed local validation.
    #[error("invalid {field}: {message}")]
    InvalidConfig {
        /// Offending configuration key.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Region code is not in the catalog.
    #[error("invalid region code: {0}. Use quismon_regions data source to list available regions")]
    InvalidRegion(String),
}

impl Error {
    /// Create a configuration validation error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingBaseUrl => ErrorCategory::Configuration,
            Error::Transport(_) => ErrorCategory::Network,
            Error::Api { status: 404, .. } => ErrorCategory::NotFound,
            Error::Api { .. } => ErrorCategory::Remote,
            Error::Decode(_) | Error::Encode(_) => ErrorCategory::Format,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::InvalidConfig { .. } | Error::InvalidRegion(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether the remote object is gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 500,
            other => other.category().is_retryable(),
        }
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
