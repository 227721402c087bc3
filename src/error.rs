//! Error definitions for gate setup and the per-request pipeline.

use thiserror::Error;

use crate::config::validation::ConfigValidationError;

/// Errors raised while constructing a [`Gate`](crate::Gate).
///
/// These are startup-time fatals: a misconfigured gate is rejected before it
/// ever sees a request.
#[derive(Debug, Error)]
pub enum GateError {
    /// Semantic configuration validation failed. Carries every violation
    /// found, not just the first.
    #[error("invalid gate configuration: {}", format_violations(.0))]
    Config(Vec<ConfigValidationError>),

    /// A configured security header could not be encoded as an HTTP header
    /// value.
    #[error("invalid value for {header} header: {message}")]
    Header { header: &'static str, message: String },
}

fn format_violations(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by the per-request pipeline.
///
/// Schema validation failure is deliberately *not* represented here: a
/// candidate that fails its schema is an expected outcome handled by the
/// gate (400 + structured errors), not an error condition.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request claimed `multipart/form-data` but the payload could not
    /// be parsed (bad boundary, truncated part, malformed headers).
    #[error("malformed multipart payload: {0}")]
    MalformedMultipart(String),

    /// The request body could not be read from the transport.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// An uploaded file exceeded the configured size cap.
    #[error("upload {field} exceeds maximum of {limit} bytes")]
    FileTooLarge { field: String, limit: u64 },

    /// Writing an accepted upload to the temp directory failed.
    #[error("upload write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The registration's schema failed to compile.
    #[error(transparent)]
    Schema(#[from] crate::schema::SchemaError),
}
