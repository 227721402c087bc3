//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Multipart extraction settings.
    pub multipart: MultipartConfig,

    /// Parameter sanitization and pollution-guard settings.
    pub sanitize: SanitizeConfig,

    /// Security response header settings.
    pub headers: HeaderConfig,

    /// Schema key derivation and validation engine settings.
    pub schema_keys: SchemaKeyConfig,

    /// Request size limits.
    pub limits: LimitsConfig,
}

/// Multipart extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MultipartConfig {
    /// Enable multipart parsing. When disabled, multipart requests
    /// contribute an empty field mapping and the body passes through.
    pub enabled: bool,

    /// Destination directory for accepted uploads.
    pub temp_upload_dir: PathBuf,

    /// Maximum size of a single uploaded file in bytes.
    pub max_file_bytes: u64,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            temp_upload_dir: std::env::temp_dir(),
            max_file_bytes: 8 * 1024 * 1024, // 8MB
        }
    }
}

/// Sanitizer and parameter-pollution guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// HTML-escape route and query parameter values before merging.
    pub url_encoded: bool,

    /// Collapse duplicate query keys to a single value.
    pub hpp_protection: bool,

    /// Which occurrence survives when the guard collapses duplicates.
    pub hpp_policy: CollapsePolicy,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            url_encoded: false,
            hpp_protection: true,
            hpp_policy: CollapsePolicy::Last,
        }
    }
}

/// Which occurrence of a polluted parameter survives collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollapsePolicy {
    /// Keep the first occurrence.
    First,
    /// Keep the last occurrence.
    #[default]
    Last,
}

/// Security response header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Strip the `X-Powered-By` header from responses.
    pub hide_powered_by: bool,

    /// Clickjacking protection via `X-Frame-Options`.
    pub x_frame: Option<XFrameOption>,

    /// Set `X-XSS-Protection: 1; mode=block`.
    pub xss_filter: bool,

    /// Content-Security-Policy directives, directive name → source list.
    pub csp: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            hide_powered_by: true,
            x_frame: None,
            xss_filter: false,
            csp: None,
        }
    }
}

/// `X-Frame-Options` policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum XFrameOption {
    /// Deny all framing.
    Deny,
    /// Allow framing only from the same origin.
    Sameorigin,
    /// Allow framing from one named origin.
    AllowFrom(String),
}

impl XFrameOption {
    /// Header value for this policy.
    pub fn header_value(&self) -> String {
        match self {
            XFrameOption::Deny => "DENY".to_string(),
            XFrameOption::Sameorigin => "SAMEORIGIN".to_string(),
            XFrameOption::AllowFrom(uri) => format!("ALLOW-FROM {uri}"),
        }
    }
}

/// Schema key derivation and validation engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SchemaKeyConfig {
    /// Derive keys from `<METHOD>_<urlencoded route path>` instead of the
    /// cache's monotonic counter.
    pub use_route_as_key: bool,

    /// JSON Schema draft to compile against. When unset, the engine infers
    /// the draft from the schema's `$schema` field.
    pub draft: Option<SchemaDraft>,
}

/// Supported JSON Schema drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDraft {
    Draft4,
    Draft6,
    Draft7,
    Draft2019,
    Draft2020,
}

impl SchemaDraft {
    pub(crate) fn engine_draft(self) -> jsonschema::Draft {
        match self {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft2019 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft2020 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum JSON body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}
