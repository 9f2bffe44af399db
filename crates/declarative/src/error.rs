//! Error taxonomy for resource operations.

use crate::diagnostics::{Diagnostic, Diagnostics};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by resources, data sources and the planner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote object no longer exists. During refresh this drops the
    /// instance from state instead of failing.
    #[error("{resource_type} {id:?} not found")]
    NotFound { resource_type: String, id: String },

    #[error("invalid import ID {id:?}: expected {expected}")]
    InvalidImportId { id: String, expected: String },

    /// Local configuration is invalid; no request was sent.
    #[error("{attribute}: {message}")]
    Configuration { attribute: String, message: String },

    /// The remote API failed.
    #[error("{summary}: {source}")]
    Remote {
        summary: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Stored attributes could not be decoded into the resource model.
    #[error("attributes for {resource_type} do not match its schema: {source}")]
    State {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}", .0)]
    Invalid(Diagnostics),

    #[error("dependency cycle between {0}")]
    Cycle(String),

    #[error("unsupported {kind} type {name:?}")]
    UnknownType { kind: &'static str, name: String },

    #[error("invalid address {0:?}: expected <type>.<name> or data.<type>.<name>")]
    InvalidAddress(String),
}

impl Error {
    pub fn configuration(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn remote(
        summary: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Remote {
            summary: summary.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Render as diagnostics, keeping the attribute path where there is one.
    pub fn into_diagnostics(self) -> Diagnostics {
        match self {
            Self::Invalid(diags) => diags,
            Self::Configuration { attribute, message } => {
                Diagnostic::error("Invalid configuration", message)
                    .with_attribute(attribute)
                    .into()
            }
            Self::NotFound { .. } => Diagnostic::error("Resource not found", self.to_string()).into(),
            Self::InvalidImportId { .. } => {
                Diagnostic::error("Invalid Import ID", self.to_string()).into()
            }
            Self::Remote { summary, source } => Diagnostic::error(summary, source.to_string()).into(),
            other => Diagnostic::error(other.to_string(), "").into(),
        }
    }
}
