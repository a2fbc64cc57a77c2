use thiserror::Error;

use crate::form::validator::ValidationReport;

#[derive(Debug, Error)]
pub enum FormError {
    /// Record failed field validation; nothing was sent
    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    /// A required endpoint is not configured
    #[error("{channel} endpoint is not configured (set {hint})")]
    Configuration { channel: &'static str, hint: &'static str },

    /// Acknowledged channel could not deliver the record
    #[error("submission failed: {0}")]
    Transport(#[from] TransportError),

    /// Field name is not part of the form schema
    #[error("unknown field '{field}' for form '{form}'")]
    UnknownField { form: String, field: String },

    /// Hidden fields are populated by the system only
    #[error("field '{0}' is hidden and cannot be edited")]
    HiddenField(String),

    /// The form is showing its submitted summary
    #[error("form '{0}' is read-only until edit is requested")]
    ReadOnly(String),

    /// Schema rule could not be compiled
    #[error("invalid rule for field '{field}': {reason}")]
    Schema { field: String, reason: String },

    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error ({context}): {source}")]
    Yaml {
        context: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the acknowledged (request/response) channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no acknowledgement within {0} ms")]
    Timeout(u64),

    #[error("endpoint answered with status {status}")]
    Status { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    /// Client could not be constructed (TLS backend, invalid options)
    #[error("client setup failed: {0}")]
    Client(String),
}

impl FormError {
    /// True when the failure happened before anything was sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, FormError::Transport(_))
    }
}
