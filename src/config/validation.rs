//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, non-empty paths)
//! - Check CSP directives against the supported set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: GateConfig → Result<(), Vec<ConfigValidationError>>
//! - Runs before the config is accepted into a gate

use thiserror::Error;

use crate::config::schema::{GateConfig, XFrameOption};

/// CSP directives the gate knows how to assemble.
pub const SUPPORTED_CSP_DIRECTIVES: &[&str] = &[
    "default-src",
    "script-src",
    "style-src",
    "img-src",
    "connect-src",
    "font-src",
    "object-src",
    "media-src",
    "frame-src",
];

/// A single semantic violation in a [`GateConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("multipart.temp_upload_dir must not be empty")]
    EmptyTempUploadDir,

    #[error("multipart.max_file_bytes must be greater than zero")]
    ZeroFileLimit,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("headers.x_frame allow-from requires a non-empty origin")]
    EmptyAllowFromOrigin,

    #[error("headers.csp contains unsupported directive `{0}`")]
    UnknownCspDirective(String),

    #[error("headers.csp directive `{0}` has no sources")]
    EmptyCspSources(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if config.multipart.temp_upload_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::EmptyTempUploadDir);
    }
    if config.multipart.max_file_bytes == 0 {
        errors.push(ConfigValidationError::ZeroFileLimit);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ConfigValidationError::ZeroBodyLimit);
    }

    if let Some(XFrameOption::AllowFrom(origin)) = &config.headers.x_frame {
        if origin.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyAllowFromOrigin);
        }
    }

    if let Some(csp) = &config.headers.csp {
        for (directive, sources) in csp {
            if !SUPPORTED_CSP_DIRECTIVES.contains(&directive.as_str()) {
                errors.push(ConfigValidationError::UnknownCspDirective(directive.clone()));
            } else if sources.is_empty() {
                errors.push(ConfigValidationError::EmptyCspSources(directive.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
